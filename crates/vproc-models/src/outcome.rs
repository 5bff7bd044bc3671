//! Business-outcome channel.
//!
//! [`Outcome`] carries expected, caller-actionable results (a file that is
//! too large, a duplicate completion message, polling before a download is
//! ready). Infrastructure and security faults never travel through here;
//! they propagate as ordinary `Err` values so they cannot be ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ProcessingStatus;

/// An expected business-state failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Rejection {
    #[error("file is empty")]
    EmptyFile,

    #[error("file too large ({size_bytes} bytes exceeds the {max_bytes} byte limit)")]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("unsupported format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("detected content type '{detected}' is not an allowed video type")]
    ContentTypeNotAllowed { detected: String },

    #[error("declared content type '{declared}' does not match detected type '{detected}'")]
    ContentTypeMismatch { declared: String, detected: String },

    #[error("owner account is not active")]
    OwnerInactive,

    #[error("illegal status transition from {from} to {to}")]
    IllegalTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },

    #[error("'{field}' is required when moving to {status}")]
    MissingField {
        field: String,
        status: ProcessingStatus,
    },

    #[error("request is not ready for download (status: {status})")]
    NotReady { status: ProcessingStatus },
}

impl Rejection {
    pub fn illegal_transition(from: ProcessingStatus, to: ProcessingStatus) -> Self {
        Self::IllegalTransition { from, to }
    }

    pub fn missing_field(field: impl Into<String>, status: ProcessingStatus) -> Self {
        Self::MissingField {
            field: field.into(),
            status,
        }
    }

    /// Stable machine-readable code, safe to hand to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::EmptyFile => "empty_file",
            Rejection::FileTooLarge { .. } => "file_too_large",
            Rejection::UnsupportedFormat { .. } => "unsupported_format",
            Rejection::ContentTypeNotAllowed { .. } => "content_type_not_allowed",
            Rejection::ContentTypeMismatch { .. } => "content_type_mismatch",
            Rejection::OwnerInactive => "owner_inactive",
            Rejection::IllegalTransition { .. } => "illegal_transition",
            Rejection::MissingField { .. } => "missing_field",
            Rejection::NotReady { .. } => "not_ready",
        }
    }
}

/// Two-variant result of a business operation: exactly one of value or
/// rejection is present.
#[must_use = "a rejected outcome must be handled by the caller"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Rejection),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub fn failure(rejection: Rejection) -> Self {
        Self::Failure(rejection)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Borrow the value, if successful.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    /// Borrow the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(r) => Some(r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Failure(r) => Outcome::Failure(r),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(v) => f(v),
            Outcome::Failure(r) => Outcome::Failure(r),
        }
    }

    /// Convert to a std `Result` for `?`-style handling.
    pub fn into_result(self) -> Result<T, Rejection> {
        match self {
            Outcome::Success(v) => Ok(v),
            Outcome::Failure(r) => Err(r),
        }
    }
}

impl<T> From<Result<T, Rejection>> for Outcome<T> {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(v) => Outcome::Success(v),
            Err(r) => Outcome::Failure(r),
        }
    }
}
