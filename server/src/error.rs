//! Error types for the validation server.
//!
//! # Error Types
//!
//! - [`ConfigError`] - Configuration errors, re-exported from [`crate::config`]
//! - [`BrokerError`] - Failures talking to the broker, re-exported from [`crate::broker`]
//! - [`ServerError`] - Top-level server errors encompassing all failure modes
//!
//! # Example
//!
//! ```rust,ignore
//! use eventtype_linter_server::error::ServerError;
//!
//! fn require_name(body: &serde_json::Value) -> Result<(), ServerError> {
//!     if body.get("name").is_none() {
//!         return Err(ServerError::validation("no event type found in the request body"));
//!     }
//!     Ok(())
//! }
//! ```

use std::error::Error;
use std::fmt;

use eventtype_linter::LintError;

pub use crate::broker::BrokerError;
pub use crate::config::ConfigError;

/// Top-level error type for the validation server.
///
/// # Error Categories
///
/// - **Configuration errors**: Problems loading or validating server config
/// - **Broker errors**: The event type(s) could not be fetched
/// - **Validation errors**: The request did not contain a usable event type
/// - **Internal errors**: The linter failed on input the broker handed us
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error during server initialization.
    Config(ConfigError),

    /// Fetching from the broker failed.
    ///
    /// `subject` names what was being fetched, e.g. `"event type"`.
    Broker {
        /// What was being fetched.
        subject: &'static str,
        /// The underlying broker failure.
        source: BrokerError,
    },

    /// Request validation failure.
    ///
    /// Returned when a request body does not hold an event type.
    Validation(String),

    /// Unexpected internal server error.
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Broker { subject, source } => write!(f, "error fetching {subject}: {source}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::Internal(msg) => write!(f, "internal server error: {msg}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Broker { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LintError> for ServerError {
    fn from(err: LintError) -> Self {
        Self::internal(err.to_string())
    }
}

impl ServerError {
    /// Creates a new broker error for the given subject.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use eventtype_linter_server::error::{BrokerError, ServerError};
    ///
    /// let err = ServerError::broker("event types", BrokerError::Timeout(Duration::from_secs(5)));
    /// assert!(matches!(err, ServerError::Broker { .. }));
    /// ```
    pub fn broker(subject: &'static str, source: BrokerError) -> Self {
        Self::Broker { subject, source }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code this error is reported with.
    ///
    /// A broker that rejected the request with a 4xx status passes that
    /// status through: the caller asked for something it may not see or
    /// that does not exist. Any other broker failure is a bad gateway.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Broker { source, .. } => source
                .status()
                .filter(|status| (400..500).contains(status))
                .unwrap_or(502),
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns `true` if this error indicates a client-side problem.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns `true` if this error indicates a server-side problem.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
