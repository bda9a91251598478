//! Login command - exchange username and password for a session token

use std::env;

use anyhow::Result;
use dialoguer::{Input, Password};
use serde::Serialize;

use super::{get_context, log_event, print_json};
use crate::output::success;

#[derive(Serialize)]
struct LoginSummary {
    username: String,
}

/// Get a value from the flag or prompt for it
pub(super) fn resolve_input(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }
    Ok(Input::new().with_prompt(prompt).interact_text()?)
}

/// Get the password from the flag, TELLER_PASSWORD, or an interactive prompt
pub(super) fn resolve_password(flag: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }

    if let Ok(p) = env::var("TELLER_PASSWORD") {
        return Ok(p);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn run(username: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let username = resolve_input(username, "Username")?;
    let password = resolve_password(password, false)?;

    let result = ctx.auth.login(&username, &password).await;
    if result.is_ok() {
        log_event("session_started");
    }

    if json {
        return print_json(result.map(|()| LoginSummary { username }));
    }

    result?;
    success(&format!("✓ Logged in as {}", username));
    Ok(())
}
