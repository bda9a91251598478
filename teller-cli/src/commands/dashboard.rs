//! Dashboard command - balance and recent transactions side by side
//!
//! Both slices load concurrently and render independently, so a failed
//! balance still shows the transaction list and vice versa.

use anyhow::Result;
use colored::Colorize;

use super::{get_context, reported};
use crate::output::{print_balance, print_transactions};

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    ctx.accounts.refresh_all().await;

    let balance = ctx.accounts.balance().state();
    let transactions = ctx.accounts.transactions().state();
    let all_failed = balance.failure().is_some() && transactions.failure().is_some();

    if json {
        let output = serde_json::json!({
            "success": !all_failed,
            "data": {
                "balance": balance,
                "transactions": transactions,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Dashboard".bold());
        println!();
        print_balance(&balance);
        println!();
        print_transactions(&transactions);
    }

    // Partial data is still a usable dashboard
    match balance.failure().filter(|_| all_failed) {
        Some(failure) => Err(reported(failure.clone())),
        None => Ok(()),
    }
}
