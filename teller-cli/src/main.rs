//! Teller CLI - your bank account in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use teller_core::OperationResult;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    balance, config, dashboard, get_logger, is_reported, log_command, log_failure, login, logout,
    logs, register, status, transactions, transfer, Failure,
};

/// Teller - your bank account in the terminal
#[derive(Parser)]
#[command(name = "teller", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Password (or set TELLER_PASSWORD)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in and store the session token
    Login {
        #[arg(long, short)]
        username: Option<String>,
        /// Password (or set TELLER_PASSWORD)
        #[arg(long, short)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and session state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current balance
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transaction history
    Transactions {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
        /// Transactions per page (defaults to api.pageSize)
        #[arg(long)]
        limit: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show balance and recent transactions
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money to another user
    Transfer {
        /// Recipient username
        #[arg(long)]
        to: Option<String>,
        /// Amount to send
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the stored API settings
    Config {
        /// Base URL of the banking API
        #[arg(long)]
        api_url: Option<String>,
        /// Default transactions per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Remove the request timeout
        #[arg(long, conflicts_with = "timeout_secs")]
        no_timeout: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Login { .. } => "login",
            Commands::Logout { .. } => "logout",
            Commands::Status { .. } => "status",
            Commands::Balance { .. } => "balance",
            Commands::Transactions { .. } => "transactions",
            Commands::Dashboard { .. } => "dashboard",
            Commands::Transfer { .. } => "transfer",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }

    fn json(&self) -> bool {
        match self {
            Commands::Register { json, .. }
            | Commands::Login { json, .. }
            | Commands::Logout { json }
            | Commands::Status { json }
            | Commands::Balance { json }
            | Commands::Transactions { json, .. }
            | Commands::Dashboard { json }
            | Commands::Transfer { json, .. }
            | Commands::Config { json, .. } => *json,
            Commands::Logs { command } => command.json(),
        }
    }
}

/// Show a failure the command has not already shown itself
fn report(failure: &Failure, json: bool) -> Result<()> {
    if json {
        let output: OperationResult<()> = failure.to_json();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::error(&failure.message);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TELLER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let command = cli.command.name();
    let json = cli.command.json();

    let logger = get_logger();
    log_command(&logger, command);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let failure = Failure::from_error(&e);
            log_failure(&logger, command, &failure);
            if !is_reported(&e) && report(&failure, json).is_err() {
                output::error(&failure.message);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register { username, email, password, json } => {
            register::run(username, email, password, json).await
        }
        Commands::Login { username, password, json } => login::run(username, password, json).await,
        Commands::Logout { json } => logout::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Balance { json } => balance::run(json).await,
        Commands::Transactions { page, limit, json } => transactions::run(page, limit, json).await,
        Commands::Dashboard { json } => dashboard::run(json).await,
        Commands::Transfer { to, amount, yes, json } => transfer::run(to, amount, yes, json).await,
        Commands::Config { api_url, page_size, timeout_secs, no_timeout, json } => {
            config::run(api_url, page_size, timeout_secs, no_timeout, json)
        }
        Commands::Logs { command } => logs::run(command),
    }
}
