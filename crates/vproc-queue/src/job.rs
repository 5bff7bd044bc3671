//! Job messages published for the processing consumer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vproc_models::{ProcessingRequest, RequestId};

/// Job asking the consumer to process an uploaded video.
///
/// Immutable once sent. The consumer reports progress back through the
/// status-update use case; redelivery of the same message is harmless
/// because status changes are guarded by the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Request this job belongs to
    pub request_id: RequestId,
    /// Owner of the request
    pub owner_id: String,
    /// Object-storage reference of the original upload
    pub storage_reference: String,
    /// Original filename
    pub filename: String,
    /// Upload size in bytes
    pub size_bytes: u64,
    /// Normalized content type detected from the upload bytes
    pub content_type: String,
    /// Delivery attempt, starting at 1 and bumped on every retry
    #[serde(default = "default_attempt")]
    pub attempt: u32,
    /// Free-form processing parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// When the job was built
    pub enqueued_at: DateTime<Utc>,
}

fn default_attempt() -> u32 {
    1
}

impl ProcessingJob {
    /// Build the first job for a freshly persisted request.
    pub fn for_request(request: &ProcessingRequest) -> Self {
        let meta = request.metadata();
        Self {
            request_id: request.id().clone(),
            owner_id: request.owner_id().to_string(),
            storage_reference: meta.storage_ref().to_string(),
            filename: meta.original_filename().to_string(),
            size_bytes: meta.size_bytes(),
            content_type: meta.content_type().to_string(),
            attempt: 1,
            params: BTreeMap::new(),
            enqueued_at: Utc::now(),
        }
    }

    /// Set the attempt number.
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt.max(1);
        self
    }

    /// Add a processing parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Generate idempotency key for deduplication at the transport.
    pub fn idempotency_key(&self) -> String {
        format!("process:{}:{}", self.request_id, self.attempt)
    }
}
