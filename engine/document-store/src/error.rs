//! Error types for the document store

use thiserror::Error;

/// Result type alias for document store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database errors (connection, query, transaction)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed collection or document id
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create a new invalid path error
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
