//! Error types shared across crates.

use thiserror::Error;

/// Failure reading or writing a session-keyed store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content is not valid JSON for the expected type.
    #[error("store content is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The session id cannot be used as a store key.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
