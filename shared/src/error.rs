//! Error types for the event announcement Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the event announcement Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Conditional write lost against a concurrent writer
    #[error("Storage conflict: {0}")]
    Conflict(String),

    /// Notification service error
    #[error("Notification error: {0}")]
    Notify(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            _ => 500,
        }
    }
}
