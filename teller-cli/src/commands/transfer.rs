//! Transfer command - send money to another user

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use super::{get_context, print_json};
use crate::output::{format_amount, print_balance, warning};

/// Use the flag value, or prompt when it is missing
fn prompt_field(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = flag.filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }
    Ok(Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

pub async fn run(to: Option<String>, amount: Option<String>, yes: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let transfers = &ctx.transfers;
    transfers.open();

    if json {
        // Non-interactive: submit exactly what was given
        let result = transfers
            .submit(to.as_deref().unwrap_or(""), amount.as_deref().unwrap_or(""))
            .await;
        return print_json(result);
    }

    let recipient = prompt_field(to, "Recipient username")?;
    transfers.set_recipient(recipient.clone());
    let amount = prompt_field(amount, "Amount")?;
    transfers.set_amount(amount.clone());

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Send {} to {}?", amount.trim(), recipient.trim()))
            .default(false)
            .interact()?;
        if !confirmed {
            transfers.close();
            warning("Cancelled");
            return Ok(());
        }
    }

    let receipt = transfers.submit_form().await?;

    println!(
        "{} {} ({} to {})",
        "✓".green(),
        receipt.message,
        format_amount(receipt.amount),
        receipt.recipient_username.bold()
    );
    print_balance(&ctx.accounts.balance().state());
    Ok(())
}
