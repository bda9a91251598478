//! Configuration management
//!
//! Settings live in settings.json in the app directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8000", "pageSize": 10, "timeoutSecs": null }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::services::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "TELLER_API_URL";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration (resolved view of settings)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub page_size: u32,
    /// None: no client-side timeout
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// A missing or malformed settings file yields defaults. The base URL
    /// can be overridden with the TELLER_API_URL environment variable.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let raw = read_settings(app_dir)?;
        Ok(Self::resolve(raw, std::env::var(API_URL_ENV).ok()))
    }

    /// Load only what settings.json holds, ignoring TELLER_API_URL
    pub fn load_stored(app_dir: &Path) -> Result<Self> {
        Ok(Self::resolve(read_settings(app_dir)?, None))
    }

    /// Whether TELLER_API_URL currently overrides the stored base URL
    pub fn url_overridden() -> bool {
        std::env::var(API_URL_ENV).is_ok_and(|url| !url.trim().is_empty())
    }

    fn resolve(raw: SettingsFile, url_override: Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = url_override
            .filter(|url| !url.trim().is_empty())
            .or(raw.api.base_url)
            .unwrap_or(defaults.base_url);

        Self {
            base_url,
            page_size: raw.api.page_size.filter(|&n| n > 0).unwrap_or(defaults.page_size),
            timeout_secs: raw.api.timeout_secs.filter(|&n| n > 0),
        }
    }

    /// Save config to the app directory, preserving settings this crate doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(app_dir)?;
        let mut settings = read_settings(app_dir)?;

        settings.api.base_url = Some(self.base_url.clone());
        settings.api.page_size = Some(self.page_size);
        settings.api.timeout_secs = self.timeout_secs;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(app_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Set the API base URL; it must be an absolute http(s) URL
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API URL must use http or https, got '{}'", url.scheme());
        }
        self.base_url = trimmed.to_string();
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<()> {
        if page_size == 0 {
            bail!("Page size must be greater than zero");
        }
        self.page_size = page_size;
        Ok(())
    }

    /// Set the request timeout; None removes it
    pub fn set_timeout_secs(&mut self, timeout_secs: Option<u64>) -> Result<()> {
        if timeout_secs == Some(0) {
            bail!("Timeout must be greater than zero");
        }
        self.timeout_secs = timeout_secs;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring malformed settings.json");
        SettingsFile::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let raw = read_settings(dir.path()).unwrap();
        let config = Config::resolve(raw, None);
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_reads_api_section() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api": {"baseUrl": "https://bank.example", "pageSize": 25, "timeoutSecs": 30}}"#,
        )
        .unwrap();

        let config = Config::resolve(read_settings(dir.path()).unwrap(), None);
        assert_eq!(config.base_url, "https://bank.example");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_env_override_wins() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api": {"baseUrl": "https://bank.example"}}"#,
        )
        .unwrap();

        let raw = read_settings(dir.path()).unwrap();
        let config = Config::resolve(raw.clone(), Some("http://127.0.0.1:9000".to_string()));
        assert_eq!(config.base_url, "http://127.0.0.1:9000");

        let config = Config::resolve(raw, Some("  ".to_string()));
        assert_eq!(config.base_url, "https://bank.example");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        let config = Config::resolve(read_settings(dir.path()).unwrap(), None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_zero_values_use_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api": {"pageSize": 0, "timeoutSecs": 0}}"#,
        )
        .unwrap();
        let config = Config::resolve(read_settings(dir.path()).unwrap(), None);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "api": {"baseUrl": "https://old", "retries": 2}}"#,
        )
        .unwrap();

        let config = Config {
            base_url: "https://new".to_string(),
            page_size: 5,
            timeout_secs: Some(10),
        };
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["api"]["retries"], 2);
        assert_eq!(json["api"]["baseUrl"], "https://new");
        assert_eq!(json["api"]["timeoutSecs"], 10);

        let reloaded = Config::load_stored(dir.path()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_setters_validate() {
        let mut config = Config::default();

        config.set_base_url(" https://bank.example/ ").unwrap();
        assert_eq!(config.base_url, "https://bank.example");
        assert!(config.set_base_url("not a url").is_err());
        assert!(config.set_base_url("ftp://bank.example").is_err());
        assert_eq!(config.base_url, "https://bank.example");

        assert!(config.set_page_size(0).is_err());
        config.set_page_size(20).unwrap();
        assert_eq!(config.page_size, 20);

        assert!(config.set_timeout_secs(Some(0)).is_err());
        config.set_timeout_secs(Some(15)).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        config.set_timeout_secs(None).unwrap();
        assert_eq!(config.timeout(), None);
    }
}
