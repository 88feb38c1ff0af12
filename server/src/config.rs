//! Server configuration module.
//!
//! Parses configuration from environment variables for the validation server.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `NAKADI_API_URL` | Yes | - | Base URL of the broker REST API |
//! | `HTTP_PORT` | No | 3000 | HTTP server port |
//! | `BROKER_TIMEOUT_SECS` | No | 5 | Timeout for requests to the broker |

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 3000;

/// Default timeout for broker requests.
const DEFAULT_BROKER_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has invalid format.
    #[error("invalid format for {var}: {message}")]
    InvalidFormat { var: String, message: String },

    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the broker REST API (e.g., `https://nakadi.example.org`).
    pub broker_url: String,

    /// HTTP server port.
    pub port: u16,

    /// Timeout applied to each broker request.
    pub broker_timeout: Duration,
}

impl Config {
    /// Creates a configuration with default port and timeout.
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            port: DEFAULT_PORT,
            broker_timeout: DEFAULT_BROKER_TIMEOUT,
        }
    }

    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `NAKADI_API_URL` is missing or not an http(s) URL
    /// - `HTTP_PORT` is not a valid u16
    /// - `BROKER_TIMEOUT_SECS` is not a positive integer
    ///
    /// # Example
    ///
    /// ```no_run
    /// use eventtype_linter_server::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// println!("Server will listen on port {}", config.port);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        let broker_url = parse_broker_url()?;
        let port = parse_port()?;
        let broker_timeout = parse_timeout()?;

        Ok(Self {
            broker_url,
            port,
            broker_timeout,
        })
    }
}

/// Parse the NAKADI_API_URL environment variable.
fn parse_broker_url() -> Result<String, ConfigError> {
    let url = match env::var("NAKADI_API_URL") {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => return Err(ConfigError::MissingEnvVar("NAKADI_API_URL".to_string())),
    };

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidFormat {
            var: "NAKADI_API_URL".to_string(),
            message: format!("expected an http(s) URL, got '{url}'"),
        });
    }

    Ok(url)
}

/// Parse the HTTP_PORT environment variable.
///
/// Returns the default port if not set.
fn parse_port() -> Result<u16, ConfigError> {
    match env::var("HTTP_PORT") {
        Ok(port_str) => Ok(port_str.parse()?),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_PORT),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidFormat {
            var: "HTTP_PORT".to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

/// Parse the BROKER_TIMEOUT_SECS environment variable.
fn parse_timeout() -> Result<Duration, ConfigError> {
    let Ok(value) = env::var("BROKER_TIMEOUT_SECS") else {
        return Ok(DEFAULT_BROKER_TIMEOUT);
    };

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidFormat {
            var: "BROKER_TIMEOUT_SECS".to_string(),
            message: format!("expected a positive number of seconds, got '{value}'"),
        }),
    }
}
