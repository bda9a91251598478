//! CLI command implementations

pub mod balance;
pub mod config;
pub mod dashboard;
pub mod login;
pub mod logout;
pub mod logs;
pub mod register;
pub mod status;
pub mod transactions;
pub mod transfer;

use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use teller_core::domain::result::Result as CoreResult;
use teller_core::domain::FetchFailure;
use teller_core::services::{EntryPoint, LoggingService};
use teller_core::{ErrorKind, OperationResult, SliceState, TellerContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Record a named event, ignoring any errors (logging should never break the app)
pub fn log_event(event: &str) {
    if let Some(l) = get_logger() {
        let _ = l.log_event(event);
    }
}

/// Record a command run, ignoring any errors
pub fn log_command(logger: &Option<LoggingService>, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Record a failed command, ignoring any errors
pub fn log_failure(logger: &Option<LoggingService>, command: &str, failure: &Failure) {
    if let Some(l) = logger {
        let details = failure.kind.map(|kind| format!("{:?}", kind));
        let _ = l.log_error(
            command,
            failure.endpoint.as_deref(),
            &failure.message,
            details.as_deref(),
        );
    }
}

/// Get the app directory from TELLER_DIR or default to ~/.teller
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TELLER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".teller"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TELLER_DIR"))
}

/// Create the teller context
pub fn get_context() -> Result<TellerContext> {
    let app_dir = get_app_dir()?;

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create teller directory: {:?}", app_dir))?;

    TellerContext::new(&app_dir).context("Failed to initialize teller context")
}

/// A failed command as shown to the user and recorded in the event log
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub endpoint: Option<String>,
}

impl Failure {
    pub fn from_error(error: &anyhow::Error) -> Self {
        if let Some(core) = error.downcast_ref::<teller_core::Error>() {
            return Self {
                message: core.user_message(),
                kind: Some(core.kind()),
                endpoint: core.endpoint().map(str::to_string),
            };
        }
        if let Some(fetch) = error.downcast_ref::<FetchFailure>() {
            return Self {
                message: fetch.message.clone(),
                kind: Some(fetch.kind),
                endpoint: fetch.endpoint.clone(),
            };
        }
        Self {
            message: format!("{:#}", error),
            kind: None,
            endpoint: None,
        }
    }

    pub fn to_json(&self) -> OperationResult<()> {
        match self.kind {
            Some(kind) => OperationResult::failed_with(&self.message, kind, self.endpoint.as_deref()),
            None => OperationResult::fail(&self.message),
        }
    }
}

/// Marks an error the command has already shown, as JSON or as a rendered slice
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failure already reported")
    }
}

fn reported(error: impl Into<anyhow::Error>) -> anyhow::Error {
    error.into().context(Reported)
}

/// Whether the command already showed this failure to the user
pub fn is_reported(error: &anyhow::Error) -> bool {
    error.downcast_ref::<Reported>().is_some()
}

/// Print a core result as OperationResult JSON
///
/// A failure is still returned so the process exits non-zero.
pub fn print_json<T: Serialize>(result: CoreResult<T>) -> Result<()> {
    match result {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
            Ok(())
        }
        Err(e) => {
            let output = OperationResult::<()>::failed_with(e.user_message(), e.kind(), e.endpoint());
            println!("{}", serde_json::to_string_pretty(&output)?);
            Err(reported(e))
        }
    }
}

/// Print a slice state as OperationResult JSON
pub fn print_slice_json<T: Serialize>(state: SliceState<T>) -> Result<()> {
    match state {
        SliceState::Loaded(value) => {
            println!("{}", serde_json::to_string_pretty(&OperationResult::ok(value))?);
            Ok(())
        }
        SliceState::Failed(failure) => {
            let output = OperationResult::<()>::failed_with(
                &failure.message,
                failure.kind,
                failure.endpoint.as_deref(),
            );
            println!("{}", serde_json::to_string_pretty(&output)?);
            Err(reported(failure))
        }
        SliceState::Idle | SliceState::Loading => {
            println!("{}", serde_json::to_string_pretty(&OperationResult::<()>::fail("Not loaded"))?);
            Err(reported(anyhow!("Not loaded")))
        }
    }
}

/// Exit status for a rendered slice: a failed slice fails the command
pub fn slice_outcome<T>(state: &SliceState<T>) -> Result<()> {
    match state.failure() {
        Some(failure) => Err(reported(failure.clone())),
        None => Ok(()),
    }
}
