use thiserror::Error;

/// Errors returned by task store operations.
///
/// None of these are fatal: the store is left unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task text cannot be empty")]
    EmptyText,

    #[error("task {0} not found")]
    NotFound(u64),

    #[error("invalid import format: {0}")]
    InvalidFormat(String),
}

/// Errors from the key-value persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TaskError> = std::result::Result<T, E>;
