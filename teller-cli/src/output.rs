//! Output formatting utilities

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use rust_decimal::{Decimal, RoundingStrategy};
use teller_core::domain::FetchFailure;
use teller_core::{SliceState, TransactionPage};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount as currency with two decimals, e.g. `$1,234.50`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

fn failure_line(what: &str, failure: &FetchFailure) -> String {
    format!("Could not load {}: {}", what, failure.message)
}

/// Render the balance slice
pub fn print_balance(state: &SliceState<Decimal>) {
    match state {
        SliceState::Idle => println!("{}", "Balance not loaded".dimmed()),
        SliceState::Loading => println!("{}", "Loading balance...".dimmed()),
        SliceState::Loaded(balance) => {
            println!("{} {}", "Balance:".bold(), format_amount(*balance).green().bold())
        }
        SliceState::Failed(failure) => error(&failure_line("balance", failure)),
    }
}

/// Render the transactions slice as a table
pub fn print_transactions(state: &SliceState<TransactionPage>) {
    let page = match state {
        SliceState::Idle => {
            println!("{}", "Transactions not loaded".dimmed());
            return;
        }
        SliceState::Loading => {
            println!("{}", "Loading transactions...".dimmed());
            return;
        }
        SliceState::Failed(failure) => {
            error(&failure_line("transactions", failure));
            return;
        }
        SliceState::Loaded(page) => page,
    };

    if page.is_empty() {
        println!("{}", format!("No transactions on page {}.", page.page).dimmed());
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Type", "Description", "Amount"]);
    for tx in &page.transactions {
        let amount = if tx.transaction_type.is_credit() {
            Cell::new(format!("+{}", format_amount(tx.amount))).fg(Color::Green)
        } else if tx.transaction_type.is_debit() {
            Cell::new(format!("-{}", format_amount(tx.amount.abs()))).fg(Color::Red)
        } else {
            Cell::new(format_amount(tx.amount))
        };
        table.add_row(vec![
            Cell::new(format_date(&tx.transaction_date)),
            Cell::new(tx.transaction_type.as_str()),
            Cell::new(tx.description_or_empty()),
            amount,
        ]);
    }

    println!("{}", table);
    println!(
        "{}",
        format!("Page {} ({} per page)", page.page, page.limit).dimmed()
    );
}
