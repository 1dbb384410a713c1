//! Scraper configuration
//!
//! Built once by the host and passed into [`JobScraper::from_config`]; nothing
//! in the crate reads the environment on its own.
//!
//! [`JobScraper::from_config`]: crate::JobScraper::from_config

use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Run the browser without a window
    pub headless: bool,
    /// Apply anti-bot-detection countermeasures
    pub stealth: bool,
    /// Chromium sandbox; containers running as root usually need it off
    pub sandbox: bool,
    /// Browser executable, auto-detected when unset
    pub chrome_path: Option<PathBuf>,
    /// Render through a Browserless-compatible service instead of a local browser
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub accept_language: String,
    pub timezone: String,
    /// Hard ceiling for the DOM to load (seconds)
    pub navigation_timeout_secs: u64,
    /// Best-effort wait for network idle after the DOM loads (seconds)
    pub network_idle_timeout_secs: u64,
    pub logging: LoggingConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            stealth: false,
            sandbox: true,
            chrome_path: None,
            browserless_url: None,
            browserless_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            accept_language: "en-US,en;q=0.9".to_string(),
            timezone: "UTC".to_string(),
            navigation_timeout_secs: 60,
            network_idle_timeout_secs: 15,
            logging: LoggingConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("SCRAPER_HEADLESS") {
            config.headless = parse_flag("SCRAPER_HEADLESS", &v)?;
        }
        if let Some(v) = get("SCRAPER_STEALTH") {
            config.stealth = parse_flag("SCRAPER_STEALTH", &v)?;
        }
        if let Some(v) = get("CHROME_SANDBOX") {
            config.sandbox = parse_flag("CHROME_SANDBOX", &v)?;
        }
        if let Some(v) = get("CHROME_BIN") {
            config.chrome_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("BROWSERLESS_URL") {
            config.browserless_url = Some(v);
        }
        if let Some(v) = get("BROWSERLESS_TOKEN") {
            config.browserless_token = Some(v);
        }
        if let Some(v) = get("SCRAPER_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = get("SCRAPER_NAVIGATION_TIMEOUT_SECS") {
            config.navigation_timeout_secs = v
                .parse()
                .with_context(|| format!("SCRAPER_NAVIGATION_TIMEOUT_SECS is not a number: '{v}'"))?;
        }
        if let Some(v) = get("SCRAPER_NETWORK_IDLE_TIMEOUT_SECS") {
            config.network_idle_timeout_secs = v
                .parse()
                .with_context(|| format!("SCRAPER_NETWORK_IDLE_TIMEOUT_SECS is not a number: '{v}'"))?;
        }
        if let Some(v) = get("LOG_FORMAT") {
            config.logging.format = match v.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => bail!("LOG_FORMAT must be 'text' or 'json', got '{v}'"),
            };
        }
        if let Some(v) = get("LOG_LEVEL") {
            config.logging.level = match v.to_lowercase().as_str() {
                "trace" => LogLevel::Trace,
                "debug" => LogLevel::Debug,
                "info" => LogLevel::Info,
                "warn" => LogLevel::Warn,
                "error" => LogLevel::Error,
                _ => bail!("Unknown LOG_LEVEL '{v}'"),
            };
        }

        if config.navigation_timeout_secs == 0 {
            bail!("SCRAPER_NAVIGATION_TIMEOUT_SECS must be greater than zero");
        }

        Ok(config)
    }
}

/// Boolean-like environment values.
fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be a boolean (true/false, 1/0, yes/no, on/off), got '{value}'"),
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: LogLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.headless);
        assert!(!config.stealth);
        assert_eq!(config.navigation_timeout_secs, 60);
        assert_eq!(config.network_idle_timeout_secs, 15);
        assert_eq!(config.browserless_url, None);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_headless_toggle() {
        for (value, expected) in [("false", false), ("0", false), ("OFF", false), ("1", true), ("yes", true)] {
            let config = ScraperConfig::from_lookup(lookup(&[("SCRAPER_HEADLESS", value)])).unwrap();
            assert_eq!(config.headless, expected, "SCRAPER_HEADLESS={value}");
        }

        // Blank counts as unset
        let config = ScraperConfig::from_lookup(lookup(&[("SCRAPER_HEADLESS", "  ")])).unwrap();
        assert!(config.headless);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(ScraperConfig::from_lookup(lookup(&[("SCRAPER_HEADLESS", "maybe")])).is_err());
        assert!(
            ScraperConfig::from_lookup(lookup(&[("SCRAPER_NAVIGATION_TIMEOUT_SECS", "soon")])).is_err()
        );
        assert!(ScraperConfig::from_lookup(lookup(&[("SCRAPER_NAVIGATION_TIMEOUT_SECS", "0")])).is_err());
        assert!(ScraperConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ScraperConfig::from_lookup(lookup(&[
            ("SCRAPER_STEALTH", "true"),
            ("CHROME_BIN", "/usr/bin/chromium"),
            ("CHROME_SANDBOX", "false"),
            ("BROWSERLESS_URL", "http://browserless:3000"),
            ("SCRAPER_NETWORK_IDLE_TIMEOUT_SECS", "5"),
            ("LOG_FORMAT", "json"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert!(config.stealth);
        assert!(!config.sandbox);
        assert_eq!(config.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(config.browserless_url.as_deref(), Some("http://browserless:3000"));
        assert_eq!(config.network_idle_timeout_secs, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{"headless": false, "logging": {"format": "json"}}"#).unwrap();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
