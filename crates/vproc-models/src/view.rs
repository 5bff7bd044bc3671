//! Read-side projections of [`ProcessingRequest`].

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ProcessingRequest, ProcessingStatus, RequestId};

/// Detailed status of a single request (for polling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusView {
    pub request_id: RequestId,
    pub status: ProcessingStatus,
    pub status_description: String,
    pub original_filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub download_ready: bool,
    pub can_retry: bool,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&ProcessingRequest> for StatusView {
    fn from(req: &ProcessingRequest) -> Self {
        Self {
            request_id: req.id().clone(),
            status: req.status(),
            status_description: req.status().description().to_string(),
            original_filename: req.metadata().original_filename().to_string(),
            size_bytes: req.metadata().size_bytes(),
            created_at: req.created_at(),
            updated_at: req.updated_at(),
            download_ready: req.is_download_ready(),
            can_retry: req.can_retry(),
            retry_count: req.retry_count(),
            error_message: req.error_message().map(str::to_string),
        }
    }
}

/// Summary of a request in an owner's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSummary {
    pub request_id: RequestId,
    pub original_filename: String,
    pub status: ProcessingStatus,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub download_ready: bool,
}

impl From<&ProcessingRequest> for RequestSummary {
    fn from(req: &ProcessingRequest) -> Self {
        Self {
            request_id: req.id().clone(),
            original_filename: req.metadata().original_filename().to_string(),
            status: req.status(),
            size_bytes: req.metadata().size_bytes(),
            created_at: req.created_at(),
            download_ready: req.is_download_ready(),
        }
    }
}

/// Human-readable byte size (e.g. `"10.0 MB"`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileMetadata;

    #[test]
    fn test_status_view_projection() {
        let meta = FileMetadata::new("clip.mp4", 2048, "video/mp4", "ref").unwrap();
        let mut req = ProcessingRequest::create("u1", meta);
        req.mark_failed("no video stream").unwrap();

        let view = StatusView::from(&req);
        assert_eq!(view.status, ProcessingStatus::Failed);
        assert_eq!(view.status_description, "Processing failed");
        assert_eq!(view.original_filename, "clip.mp4");
        assert!(view.can_retry);
        assert!(!view.download_ready);
        assert_eq!(view.error_message.as_deref(), Some("no video stream"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_bytes(1536), "1.5 KB");
    }
}
