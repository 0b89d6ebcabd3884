//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from an optional TOML file with environment variable
//! overrides. The bot token is only ever read from `BOT_TOKEN`.
//!
//! # Example
//!
//! ```no_run
//! use ordertaker::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::browser::BrowserConfig;
use super::dashboard::DashboardConfig;
use super::database::{sqlite_path, DEFAULT_DATABASE_URL};
use super::logging::LoggingConfig;
use super::telegram::TelegramAppConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dashboard location.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Browser automation settings.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Database URL. Overridden by `DATABASE_URL`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Config {
    /// Parse configuration from TOML content and apply overrides from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed, an override is
    /// invalid, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::parse_toml`].
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env<F>(content: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults plus
    /// environment when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    fn apply_env<F>(&mut self, env: F) -> std::result::Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = env("BOT_TOKEN") {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(url) = env("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(level) = env("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(headless) = env("HEADLESS") {
            self.browser.headless = headless.to_lowercase() != "false";
        }
        if let Some(path) = env("GECKODRIVER_PATH").filter(|p| !p.is_empty()) {
            self.browser.geckodriver_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env("FIREFOX_PATH").filter(|p| !p.is_empty()) {
            self.browser.firefox_path = Some(PathBuf::from(path));
        }
        if let Some(token) = env("DASHBOARD_TOKEN") {
            self.dashboard.access_token = Some(token);
        }
        if let Some(chats) = env("TELEGRAM_ALLOWED_CHATS") {
            self.telegram.allowed_chat_ids = parse_chat_list(&chats)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingField { field: "BOT_TOKEN" });
        }
        if let Err(e) = url::Url::parse(&self.dashboard.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: e.to_string(),
            });
        }
        sqlite_path(&self.database_url)?;
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be `pretty` or `json`".to_string(),
            });
        }
        if self.browser.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.browser.page_load_timeout_secs == 0
            || self.browser.element_wait_timeout_secs == 0
            || self.browser.alert_wait_timeout_secs == 0
        {
            return Err(ConfigError::InvalidValue {
                field: "timeouts",
                reason: "browser timeouts must be greater than 0".to_string(),
            });
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_size",
                reason: "window dimensions must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Path of the SQLite database file.
    #[must_use]
    pub fn database_path(&self) -> String {
        sqlite_path(&self.database_url).unwrap_or_else(|_| self.database_url.clone())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn parse_chat_list(raw: &str) -> std::result::Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                field: "TELEGRAM_ALLOWED_CHATS",
                reason: format!("`{part}` is not a chat id"),
            })
        })
        .collect()
}
