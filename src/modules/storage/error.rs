use std::time::Duration;

use thiserror::Error;

/// Failure of an underlying content or metadata store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Path is outside the storage root: {0}")]
    OutsideRoot(String),
}
