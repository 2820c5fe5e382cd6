//! Error types for block extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while fetching and converting blocks.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Upstream returned something that is not a block hash.
    #[error("invalid block hash: {0}")]
    InvalidBlockHash(String),

    /// Upstream returned something that is not a block height.
    #[error("invalid block height: {0}")]
    InvalidBlockHeight(String),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A satoshi value that is not a non-negative integer.
    #[error("satoshi value is not losslessly convertible: {0}")]
    FractionalSats(f64),

    /// Response shape did not match the Esplora contract.
    #[error("malformed response: {0}")]
    Malformed(String),
}
