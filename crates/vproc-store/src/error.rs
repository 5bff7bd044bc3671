//! Repository error types.

use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur while reading or writing requests.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepoError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
