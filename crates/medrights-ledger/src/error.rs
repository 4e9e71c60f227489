//! Error types for medrights-ledger

use thiserror::Error;

/// Ledger error type
#[derive(Debug, Error)]
pub enum Error {
    /// File system error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
