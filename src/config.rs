//! Client configuration from the environment

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Delay between tearing down a session and re-initializing it
pub const DEFAULT_RESET_DELAY_MS: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings for reaching the chat service and pacing the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the tour chat backend
    pub api_url: String,
    /// Transport timeout for a single request
    pub request_timeout: Duration,
    pub reset_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reset_delay: Duration::from_millis(DEFAULT_RESET_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Read `TOUR_CHAT_API_URL`, `TOUR_CHAT_TIMEOUT_SECS` and `TOUR_CHAT_RESET_DELAY_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("TOUR_CHAT_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let request_timeout = parse_number(&lookup, "TOUR_CHAT_TIMEOUT_SECS")?
            .map_or(defaults.request_timeout, Duration::from_secs);

        let reset_delay = parse_number(&lookup, "TOUR_CHAT_RESET_DELAY_MS")?
            .map_or(defaults.reset_delay, Duration::from_millis);

        Ok(Self {
            api_url,
            request_timeout,
            reset_delay,
        })
    }
}

fn parse_number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var, value })
        })
        .transpose()
}
