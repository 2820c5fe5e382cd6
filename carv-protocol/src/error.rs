//! Parser error types.
//!
//! Both kinds are per-transaction: the transformer logs them and drops the
//! transaction's contribution, never the block.

use thiserror::Error;

/// Result type for protocol parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors a protocol parser can report for one transaction.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Structural problems in the metadata output: short/hex/length/format.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// Semantic validation failures: supply overflow, misplaced outputs,
    /// unknown coin, id collision, unbalanced transfer.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl ParseError {
    /// Create a MalformedMetadata error.
    pub fn malformed(message: impl Into<String>) -> Self {
        ParseError::MalformedMetadata(message.into())
    }

    /// Create an InvalidOperation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        ParseError::InvalidOperation(message.into())
    }
}
