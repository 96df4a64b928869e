//! Desk error types

use thiserror::Error;

/// Errors that can occur while accepting or reading records
#[derive(Error, Debug)]
pub enum DeskError {
    /// Required fields missing or blank
    #[error("{0}")]
    Validation(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for DeskError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Errors raised while delivering a confirmation mail
///
/// These never reach an HTTP caller; the notifier logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Invalid mail address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build mail: {0}")]
    Message(String),

    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// Result type for desk operations
pub type Result<T> = std::result::Result<T, DeskError>;
