//! Status command - show configuration and session state

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::get_context;
use crate::output::create_table;

#[derive(Serialize)]
struct StatusSummary {
    api_url: String,
    app_dir: String,
    authenticated: bool,
    page_size: u32,
    timeout_secs: Option<u64>,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let status = StatusSummary {
        api_url: ctx.gateway.base_url().to_string(),
        app_dir: ctx.app_dir.display().to_string(),
        authenticated: ctx.auth.is_authenticated()?,
        page_size: ctx.config.page_size,
        timeout_secs: ctx.config.timeout_secs,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Teller Status".bold());
    println!();

    let session = if status.authenticated {
        "logged in".green().to_string()
    } else {
        "not logged in".yellow().to_string()
    };
    let timeout = status
        .timeout_secs
        .map(|s| format!("{}s", s))
        .unwrap_or_else(|| "none".to_string());

    let mut table = create_table();
    table.add_row(vec!["API", status.api_url.as_str()]);
    table.add_row(vec!["Directory", status.app_dir.as_str()]);
    table.add_row(vec!["Session", session.as_str()]);
    table.add_row(vec!["Page size", &status.page_size.to_string()]);
    table.add_row(vec!["Timeout", timeout.as_str()]);
    println!("{}", table);

    Ok(())
}
