//! Config command - show or change the stored API settings

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use teller_core::config::{Config, API_URL_ENV, SETTINGS_FILE};

use super::get_app_dir;
use crate::output::{create_table, success, warning};

#[derive(Serialize)]
struct ConfigSummary {
    api_url: String,
    page_size: u32,
    timeout_secs: Option<u64>,
    settings_path: String,
    url_overridden: bool,
}

pub fn run(
    api_url: Option<String>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
    no_timeout: bool,
    json: bool,
) -> Result<()> {
    let app_dir = get_app_dir()?;
    let mut config = Config::load_stored(&app_dir)?;
    let changing = api_url.is_some() || page_size.is_some() || timeout_secs.is_some() || no_timeout;

    if let Some(url) = api_url {
        config.set_base_url(&url)?;
    }
    if let Some(size) = page_size {
        config.set_page_size(size)?;
    }
    if no_timeout {
        config.set_timeout_secs(None)?;
    } else if timeout_secs.is_some() {
        config.set_timeout_secs(timeout_secs)?;
    }

    if changing {
        config.save(&app_dir)?;
    }

    let summary = ConfigSummary {
        api_url: config.base_url.clone(),
        page_size: config.page_size,
        timeout_secs: config.timeout_secs,
        settings_path: app_dir.join(SETTINGS_FILE).display().to_string(),
        url_overridden: Config::url_overridden(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if changing {
        success("✓ Settings saved");
    } else {
        println!("{}", "Stored settings".bold());
    }

    let timeout = summary
        .timeout_secs
        .map(|s| format!("{}s", s))
        .unwrap_or_else(|| "none".to_string());

    let mut table = create_table();
    table.add_row(vec!["API", summary.api_url.as_str()]);
    table.add_row(vec!["Page size", &summary.page_size.to_string()]);
    table.add_row(vec!["Timeout", timeout.as_str()]);
    table.add_row(vec!["File", summary.settings_path.as_str()]);
    println!("{}", table);

    if summary.url_overridden {
        warning(&format!("{} is set and overrides the stored API URL", API_URL_ENV));
    }
    Ok(())
}
