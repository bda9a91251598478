//! Logout command - forget the stored session

use anyhow::Result;

use super::{get_context, log_event, print_json};
use crate::output::{info, success};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let was_logged_in = ctx.auth.is_authenticated()?;
    let result = ctx.auth.logout();
    if was_logged_in && result.is_ok() {
        log_event("session_ended");
    }

    if json {
        return print_json(result.map(|()| serde_json::json!({ "was_logged_in": was_logged_in })));
    }

    result?;
    if was_logged_in {
        success("✓ Logged out");
    } else {
        info("Not logged in.");
    }
    Ok(())
}
