//! Error types for concord.

use thiserror::Error;

/// Result type for concord operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for concord operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Record parsing failed (bad JSON, missing required field, inverted span).
    #[error(transparent)]
    Record(#[from] concord_core::Error),

    /// An internal consistency check failed. Always a bug, never bad input.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input path or glob pattern could not be resolved.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invariant violation error.
    #[must_use]
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
