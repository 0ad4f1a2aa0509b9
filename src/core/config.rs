//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults, and validated once at startup.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// AnkiConnect client configuration.
    pub anki: AnkiConnectConfig,

    /// Thresholds used by the analytics tools.
    pub analytics: AnalyticsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Connection settings for the AnkiConnect add-on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnkiConnectConfig {
    /// Endpoint of the AnkiConnect HTTP server.
    pub url: String,

    /// AnkiConnect API version sent with every request.
    pub version: u32,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: f64,

    /// TCP connect timeout in seconds.
    pub connection_timeout_secs: f64,

    /// Total number of attempts made for a call that keeps failing transiently.
    /// Zero behaves like one.
    pub max_retries: u32,

    /// Base delay in seconds for exponential backoff between attempts.
    pub retry_delay_secs: f64,

    /// Note type used when a caller does not name one.
    pub default_note_type: String,

    /// Upper bound on in-flight requests to AnkiConnect.
    pub max_concurrent_requests: usize,
}

/// Interval thresholds (in days) for card maturity buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Cards with an interval below this are counted as new.
    pub new_interval_days: i64,

    /// Cards with an interval at or above this are counted as mature.
    pub mature_interval_days: i64,
}

/// Upper bound for any timeout or delay setting, in seconds.
const MAX_DURATION_SECS: f64 = 3600.0;

/// Convert a seconds setting, rejecting NaN, infinities and absurd values.
fn seconds(value: f64, name: &str) -> Result<Duration> {
    if !(0.0..=MAX_DURATION_SECS).contains(&value) {
        return Err(Error::config(format!(
            "{} must be between 0 and {} seconds (got {})",
            name, MAX_DURATION_SECS, value
        )));
    }
    Duration::try_from_secs_f64(value).map_err(|e| Error::config(format!("{}: {}", name, e)))
}

impl AnkiConnectConfig {
    /// Whole-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Result<Duration> {
        seconds(self.request_timeout_secs, "Request timeout")
    }

    /// Connect timeout as a `Duration`.
    pub fn connection_timeout(&self) -> Result<Duration> {
        seconds(self.connection_timeout_secs, "Connection timeout")
    }

    /// Base backoff delay as a `Duration`.
    pub fn retry_delay(&self) -> Result<Duration> {
        seconds(self.retry_delay_secs, "Retry delay")
    }
}

impl Default for AnkiConnectConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8765".to_string(),
            version: 6,
            request_timeout_secs: 30.0,
            connection_timeout_secs: 10.0,
            max_retries: 3,
            retry_delay_secs: 1.0,
            default_note_type: "Basic".to_string(),
            max_concurrent_requests: 10,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            new_interval_days: 1,
            mature_interval_days: 21,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "anki-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            anki: AnkiConnectConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

/// Parse an environment variable, keeping `current` when unset or invalid.
pub(crate) fn env_parse<T>(key: &str, current: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: '{}' (keeping {})", key, raw, current);
                current
            }
        },
        Err(_) => current,
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_TRANSPORT`), AnkiConnect settings use `ANKI_`
    /// (`ANKI_CONNECT_URL`, `ANKI_MAX_RETRIES`, ...).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        let anki = &mut config.anki;
        if let Ok(url) = std::env::var("ANKI_CONNECT_URL") {
            anki.url = url;
        }
        anki.version = env_parse("ANKI_CONNECT_VERSION", anki.version);
        anki.request_timeout_secs = env_parse("ANKI_REQUEST_TIMEOUT", anki.request_timeout_secs);
        anki.connection_timeout_secs =
            env_parse("ANKI_CONNECTION_TIMEOUT", anki.connection_timeout_secs);
        anki.max_retries = env_parse("ANKI_MAX_RETRIES", anki.max_retries);
        anki.retry_delay_secs = env_parse("ANKI_RETRY_DELAY", anki.retry_delay_secs);
        anki.max_concurrent_requests =
            env_parse("ANKI_MAX_CONCURRENT_REQUESTS", anki.max_concurrent_requests);
        if let Ok(note_type) = std::env::var("ANKI_DEFAULT_NOTE_TYPE") {
            anki.default_note_type = note_type;
        }

        let analytics = &mut config.analytics;
        analytics.new_interval_days =
            env_parse("ANKI_NEW_INTERVAL_DAYS", analytics.new_interval_days);
        analytics.mature_interval_days =
            env_parse("ANKI_MATURE_INTERVAL_DAYS", analytics.mature_interval_days);

        info!(
            "AnkiConnect endpoint: {} (API v{}, {} attempts max)",
            config.anki.url, config.anki.version, config.anki.max_retries
        );

        config
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let anki = &self.anki;
        if anki.url.trim().is_empty() {
            return Err(Error::config("ANKI_CONNECT_URL must not be empty"));
        }
        if anki.version == 0 {
            return Err(Error::config("AnkiConnect version must be greater than 0"));
        }
        if anki.request_timeout()?.is_zero() {
            return Err(Error::config("Request timeout must be greater than 0"));
        }
        if anki.connection_timeout()?.is_zero() {
            return Err(Error::config("Connection timeout must be greater than 0"));
        }
        anki.retry_delay()?;
        if anki.max_concurrent_requests == 0 {
            return Err(Error::config(
                "Max concurrent requests must be greater than 0",
            ));
        }
        if anki.default_note_type.trim().is_empty() {
            return Err(Error::config("Default note type must not be empty"));
        }
        if self.analytics.new_interval_days >= self.analytics.mature_interval_days {
            return Err(Error::config(format!(
                "New interval threshold ({}) must be below the mature threshold ({})",
                self.analytics.new_interval_days, self.analytics.mature_interval_days
            )));
        }
        Ok(())
    }
}
