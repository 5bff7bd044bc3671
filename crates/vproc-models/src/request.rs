//! The processing-request aggregate.
//!
//! A [`ProcessingRequest`] is the unit of consistency for one upload. Status
//! only changes through the mutators below, each of which consults the
//! transition table first and leaves every field untouched when the move is
//! not allowed.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::Rejection;
use crate::status::{can_transition, ProcessingStatus};
use crate::FileMetadata;

/// Unique identifier for a processing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A video processing request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingRequest {
    id: RequestId,
    owner_id: String,
    metadata: FileMetadata,
    status: ProcessingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processed_file_ref: Option<String>,
    /// Number of times the request was sent back to pending after failing
    #[serde(default)]
    retry_count: u32,
}

impl ProcessingRequest {
    /// Create a new pending request.
    pub fn create(owner_id: impl Into<String>, metadata: FileMetadata) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::new(),
            owner_id: owner_id.into(),
            metadata,
            status: ProcessingStatus::Pending,
            created_at: now,
            updated_at: now,
            error_message: None,
            processed_file_ref: None,
            retry_count: 0,
        }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Check whether `owner_id` owns this request.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn processed_file_ref(&self) -> Option<&str> {
        self.processed_file_ref.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Pending -> Processing.
    pub fn start_processing(&mut self) -> Result<(), Rejection> {
        self.guard(ProcessingStatus::Processing)?;
        self.apply(ProcessingStatus::Processing);
        Ok(())
    }

    /// Processing -> Completed, recording where the processed artifact lives.
    pub fn mark_completed(&mut self, processed_file_ref: impl Into<String>) -> Result<(), Rejection> {
        let processed_file_ref = processed_file_ref.into();
        self.guard(ProcessingStatus::Completed)?;
        if processed_file_ref.trim().is_empty() {
            return Err(Rejection::missing_field(
                "processed_file_ref",
                ProcessingStatus::Completed,
            ));
        }

        self.processed_file_ref = Some(processed_file_ref);
        self.error_message = None;
        self.apply(ProcessingStatus::Completed);
        Ok(())
    }

    /// Any non-terminal state -> Failed.
    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<(), Rejection> {
        let message = message.into();
        self.guard(ProcessingStatus::Failed)?;
        if message.trim().is_empty() {
            return Err(Rejection::missing_field("error_message", ProcessingStatus::Failed));
        }

        self.error_message = Some(message);
        self.apply(ProcessingStatus::Failed);
        Ok(())
    }

    /// Failed -> Pending, clearing the previous failure.
    pub fn retry(&mut self) -> Result<(), Rejection> {
        self.guard(ProcessingStatus::Pending)?;
        self.error_message = None;
        self.retry_count += 1;
        self.apply(ProcessingStatus::Pending);
        Ok(())
    }

    /// True iff completed and the processed artifact reference is present.
    pub fn is_download_ready(&self) -> bool {
        self.status == ProcessingStatus::Completed
            && self
                .processed_file_ref
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty())
    }

    pub fn can_retry(&self) -> bool {
        self.status == ProcessingStatus::Failed
    }

    fn guard(&self, target: ProcessingStatus) -> Result<(), Rejection> {
        if can_transition(self.status, target) {
            Ok(())
        } else {
            Err(Rejection::illegal_transition(self.status, target))
        }
    }

    fn apply(&mut self, target: ProcessingStatus) {
        self.status = target;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProcessingRequest {
        let meta = FileMetadata::new("clip.mp4", 10, "video/mp4", "uploads/u1/x/clip.mp4").unwrap();
        ProcessingRequest::create("u1", meta)
    }

    #[test]
    fn test_request_creation() {
        let req = request();
        assert_eq!(req.status(), ProcessingStatus::Pending);
        assert_eq!(req.created_at(), req.updated_at());
        assert!(req.is_owned_by("u1"));
        assert!(!req.is_download_ready());
        assert!(!req.can_retry());
    }

    #[test]
    fn test_happy_path() {
        let mut req = request();
        req.start_processing().unwrap();
        assert_eq!(req.status(), ProcessingStatus::Processing);

        req.mark_completed("out/1.zip").unwrap();
        assert_eq!(req.status(), ProcessingStatus::Completed);
        assert_eq!(req.processed_file_ref(), Some("out/1.zip"));
        assert!(req.is_download_ready());
    }

    #[test]
    fn test_illegal_transition_leaves_request_untouched() {
        let mut req = request();
        let before = req.clone();

        let err = req.mark_completed("out/1.zip").unwrap_err();
        assert_eq!(
            err,
            Rejection::illegal_transition(ProcessingStatus::Pending, ProcessingStatus::Completed)
        );
        assert_eq!(req, before);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut req = request();
        req.start_processing().unwrap();
        req.mark_completed("out/1.zip").unwrap();
        let before = req.clone();

        assert!(req.start_processing().is_err());
        assert!(req.mark_completed("out/2.zip").is_err());
        assert!(req.mark_failed("late failure").is_err());
        assert!(req.retry().is_err());
        assert_eq!(req, before);
    }

    #[test]
    fn test_missing_fields_are_rejected_without_mutation() {
        let mut req = request();
        req.start_processing().unwrap();
        let before = req.clone();

        assert_eq!(
            req.mark_completed("  ").unwrap_err().code(),
            "missing_field"
        );
        assert_eq!(req.mark_failed("").unwrap_err().code(), "missing_field");
        assert_eq!(req, before);
    }

    #[test]
    fn test_failure_and_retry() {
        let mut req = request();
        req.mark_failed("decoder crashed").unwrap();
        assert_eq!(req.status(), ProcessingStatus::Failed);
        assert_eq!(req.error_message(), Some("decoder crashed"));
        assert!(req.can_retry());
        assert!(!req.is_download_ready());

        // Failed is terminal apart from the retry edge
        assert!(req.mark_failed("again").is_err());

        req.retry().unwrap();
        assert_eq!(req.status(), ProcessingStatus::Pending);
        assert!(req.error_message().is_none());
        assert_eq!(req.retry_count(), 1);
    }

    #[test]
    fn test_serde_round_trip_keeps_state() {
        let mut req = request();
        req.mark_failed("boom").unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let back: ProcessingRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
