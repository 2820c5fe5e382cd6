//! Error types shared across the indexer.
//!
//! Crate-local error enums (`ParseError`, `ExtractError`, `ApiError`) wrap or
//! sit beside this type; the store and loader use it directly.

use thiserror::Error;

/// Result type for indexer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the store and loader layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Varint input ran out before a terminating byte.
    #[error("malformed varint: input exhausted before terminating byte")]
    MalformedVarint,

    /// The code itself is wrong: an index update broke a store invariant.
    /// Callers must treat this as fatal and stop ingesting.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Persistent backend failure (transient; callers may retry).
    #[error("storage error: {0}")]
    Storage(String),

    /// Value encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an InvariantViolation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Error::InvariantViolation(message.into())
    }

    /// Create a Storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Check if this error is retryable (IO-flavored, not a logic bug).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
