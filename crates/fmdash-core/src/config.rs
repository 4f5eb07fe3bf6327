//! Configuration management for the analytics dashboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::DashboardVariant;
use crate::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every analytics path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token sent as the `access_token` query parameter
    #[serde(default)]
    pub access_token: Option<String>,

    /// Site used when the store holds no `selectedSiteId`
    #[serde(default)]
    pub site_id: Option<String>,

    /// Total request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Which dashboard flavour to load and persist
    #[serde(default)]
    pub variant: DashboardVariant,

    /// JSON file backing the key-value store; the CLI uses `fmdash-dashboard.json`
    /// in the working directory when unset
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            site_id: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `fmdash.toml` (if present) and `FMDASH__*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file when given
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the values cannot be
    /// deserialized, or validation fails.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("fmdash").required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("FMDASH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::validation("api.base_url", "must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::validation(
                "api.base_url",
                format!("'{base_url}' is not an http(s) URL"),
            ));
        }
        if self.api.request_timeout == 0 {
            return Err(Error::validation("api.request_timeout", "must be at least 1 second"));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::validation(
                "logging.format",
                format!("'{}' is not one of json, pretty", self.logging.format),
            ));
        }
        Ok(())
    }
}
