use thiserror::Error;

use crate::core::error::AppError;
use crate::modules::storage::StoreError;

/// Failures of the file lifecycle operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file size exceeds the limit of {limit} bytes")]
    SizeExceeded { limit: usize, actual: usize },

    #[error("file is required")]
    MissingFile,

    #[error("file not found")]
    NotFound,

    /// Metadata exists but the content is gone
    #[error("file content not found")]
    ContentNotFound,

    #[error("unauthorized file access, you can only access your own files")]
    UnauthorizedAccess { anonymous: bool },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        let message = err.to_string();
        match err {
            FileError::SizeExceeded { .. } => AppError::PayloadTooLarge(message),
            FileError::MissingFile => AppError::Validation(message),
            FileError::NotFound | FileError::ContentNotFound => AppError::NotFound(message),
            FileError::UnauthorizedAccess { anonymous: true } => AppError::Unauthorized(message),
            FileError::UnauthorizedAccess { anonymous: false } => AppError::Forbidden(message),
            FileError::Store(StoreError::Database(e)) => AppError::Database(e),
            FileError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
