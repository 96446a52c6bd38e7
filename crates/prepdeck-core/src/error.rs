//! Error types for prepdeck-core

use thiserror::Error;

/// Result type alias using prepdeck-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in prepdeck-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Submission not found
    #[error("Submission not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint rejected a delivery (non-2xx response)
    #[error("Delivery rejected: {0}")]
    Delivery(String),
}
