//! Error types for progress storage

use thiserror::Error;

/// Storage backend error
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Progress could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend refused the write (e.g. quota exceeded)
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
