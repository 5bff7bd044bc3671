//! Fault types for the processing core.
//!
//! Faults cover conditions the caller did not expect: a request that does
//! not exist (or belongs to someone else) and infrastructure failures.
//! Expected business outcomes are returned as `Outcome` values instead.

use thiserror::Error;

use vproc_models::ModelError;
use vproc_queue::QueueError;
use vproc_storage::StorageError;
use vproc_store::RepoError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing request, or a request owned by someone else. Both cases
    /// produce this exact value so callers cannot tell them apart.
    #[error("Processing request not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound)
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound => "not_found",
            _ => "internal_error",
        }
    }

    /// Message safe to return to an untrusted caller.
    ///
    /// Infrastructure faults collapse to a generic message; the detailed
    /// `Display` output is for logs only.
    pub fn public_message(&self) -> &'static str {
        match self {
            CoreError::NotFound => "Processing request not found",
            _ => "An internal error occurred",
        }
    }
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        CoreError::Internal(e.to_string())
    }
}
