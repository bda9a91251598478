//! Register command - create a new account on the banking service

use anyhow::Result;
use colored::Colorize;

use super::login::{resolve_input, resolve_password};
use super::{get_context, print_json};
use crate::output::success;

pub async fn run(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let username = resolve_input(username, "Username")?;
    let email = resolve_input(email, "Email")?;
    let password = resolve_password(password, true)?;

    let result = ctx.auth.register(&username, &email, &password).await;

    if json {
        return print_json(result);
    }

    let response = result?;
    let message = response
        .message
        .unwrap_or_else(|| "Registration successful".to_string());
    success(&format!("✓ {}", message));
    println!("{}", format!("Run 'teller login --username {}' to sign in.", username).dimmed());
    Ok(())
}
