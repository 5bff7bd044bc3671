//! Model construction errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when a model value would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}

impl ModelError {
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}
