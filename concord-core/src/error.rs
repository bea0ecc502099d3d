//! Error types for concord-core.

use thiserror::Error;

/// Result type for concord-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for concord-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A record line could not be turned into a `DocumentRecord`.
    #[error("Malformed record at {source_name}:{line}: {reason}")]
    MalformedRecord {
        /// File name (or `-` for stdin) the line came from.
        source_name: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    /// True for errors caused by bad input data rather than the environment.
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
