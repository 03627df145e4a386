//! Configuration loading, validation, and management for Toolstream.
//!
//! Loads configuration from `~/.toolstream/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.toolstream/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the chat backend.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Default domain tag sent with every request.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Default mode tag sent with every request.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Maximum tool-execution rounds per turn.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Display title for newly created backend sessions.
    #[serde(default = "default_session_title")]
    pub session_title: String,
}

fn default_server_url() -> String {
    "http://localhost:8000".into()
}
fn default_domain() -> String {
    "general".into()
}
fn default_mode() -> String {
    "consult".into()
}
fn default_max_iterations() -> u32 {
    5
}
fn default_request_timeout_secs() -> u64 {
    300
}
fn default_session_title() -> String {
    "Toolstream Chat Session".into()
}

impl AppConfig {
    /// Load configuration from the default path (~/.toolstream/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `TOOLSTREAM_SERVER_URL`
    /// - `TOOLSTREAM_DOMAIN`
    /// - `TOOLSTREAM_MODE`
    /// - `TOOLSTREAM_MAX_ITERATIONS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(url) = std::env::var("TOOLSTREAM_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(domain) = std::env::var("TOOLSTREAM_DOMAIN") {
            config.domain = domain;
        }
        if let Ok(mode) = std::env::var("TOOLSTREAM_MODE") {
            config.mode = mode;
        }
        if let Ok(max) = std::env::var("TOOLSTREAM_MAX_ITERATIONS") {
            config.max_iterations = max.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "TOOLSTREAM_MAX_ITERATIONS must be an integer, got '{max}'"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".toolstream")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server_url must not be empty".into(),
            ));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "server_url must be an http(s) URL, got '{}'",
                self.server_url
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            domain: default_domain(),
            mode: default_mode(),
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout_secs(),
            session_title: default_session_title(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
