//! Runtime configuration
//!
//! Read once from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// JSON catalog path; unset means the bundled catalog
pub const CATALOG_PATH_ENV: &str = "MEAL_ANALYZER_CATALOG_PATH";
/// API key for the vision model; unset or empty disables remote analysis
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "MEAL_ANALYZER_MODEL";
pub const ENDPOINT_ENV: &str = "MEAL_ANALYZER_ENDPOINT";
pub const TIMEOUT_ENV: &str = "MEAL_ANALYZER_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration error types
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("MEAL_ANALYZER_TIMEOUT_SECS must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
}

/// Settings for the remote vision model
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub catalog_path: Option<PathBuf>,
    /// `None` when no API key is configured
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout = match non_empty(TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let remote = non_empty(API_KEY_ENV).map(|api_key| RemoteConfig {
            api_key,
            model: non_empty(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: non_empty(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout,
        });

        Ok(Self {
            catalog_path: non_empty(CATALOG_PATH_ENV).map(PathBuf::from),
            remote,
        })
    }
}
