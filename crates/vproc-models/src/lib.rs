//! Shared data models for the video processing core.
//!
//! This crate provides Serde-serializable types for:
//! - The processing status state machine
//! - Uploaded file metadata
//! - The processing-request aggregate
//! - The business-outcome channel (`Outcome` / `Rejection`)
//! - Read-side status views

pub mod error;
pub mod metadata;
pub mod outcome;
pub mod request;
pub mod status;
pub mod view;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use metadata::{file_extension, FileMetadata};
pub use outcome::{Outcome, Rejection};
pub use request::{ProcessingRequest, RequestId};
pub use status::{can_transition, is_terminal, ProcessingStatus};
pub use view::{format_bytes, RequestSummary, StatusView};
