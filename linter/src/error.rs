//! Error types for the event type linter.
//!
//! Business findings are never errors: they are reported as
//! [`Issue`](crate::types::Issue)s. The variants here cover input that
//! cannot be read as an event type at all, plus the I/O and JSON failures
//! of the command-line front end.

use thiserror::Error;

/// Errors that can occur while linting event types.
///
/// # Examples
///
/// ```
/// use eventtype_linter::error::LintError;
///
/// let err = LintError::invalid_input("expected a JSON object, got number");
/// assert_eq!(
///     err.to_string(),
///     "invalid input: expected a JSON object, got number"
/// );
/// ```
#[derive(Error, Debug)]
pub enum LintError {
    /// The input is not shaped like an event type.
    ///
    /// Raised for non-objects, objects without a `name`, and fields
    /// holding values of the wrong JSON type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw input could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LintError {
    /// Creates a new invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` if the caller supplied malformed input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// A specialized Result type for linter operations.
pub type Result<T> = std::result::Result<T, LintError>;
