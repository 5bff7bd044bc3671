//! Object storage port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Default expiry for download URLs (15 minutes).
pub const DEFAULT_DOWNLOAD_EXPIRY_MINUTES: u32 = 15;

/// Maximum allowed expiry (7 days) to prevent long-lived URL leakage.
pub const MAX_EXPIRY_MINUTES: u32 = 7 * 24 * 60;

/// Information about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub stored_at: DateTime<Utc>,
}

/// Blob storage for uploaded and processed files.
///
/// References returned by [`ObjectStorage::store`] are opaque to callers and
/// only meaningful to the same backend.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under a key derived from `name`, returning the reference.
    async fn store(
        &self,
        data: Vec<u8>,
        name: &str,
        content_type: &str,
        size_bytes: u64,
    ) -> StorageResult<String>;

    /// Mint a time-limited URL for downloading `reference`.
    async fn generate_download_url(
        &self,
        reference: &str,
        expires_in_minutes: u32,
    ) -> StorageResult<String>;

    /// Server-side copy.
    async fn copy(&self, source: &str, destination: &str) -> StorageResult<()>;

    /// Object metadata, or `None` if the object does not exist.
    async fn metadata(&self, reference: &str) -> StorageResult<Option<ObjectInfo>>;

    async fn exists(&self, reference: &str) -> StorageResult<bool> {
        Ok(self.metadata(reference).await?.is_some())
    }
}

/// Clamp a requested expiry into `1..=MAX_EXPIRY_MINUTES`.
pub fn clamp_expiry_minutes(minutes: u32) -> u32 {
    minutes.clamp(1, MAX_EXPIRY_MINUTES)
}

/// Make a user-supplied filename safe for use in an object key.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so the result can never be `..`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.chars().take(200).collect()
    }
}

/// Object key for an original upload.
pub fn upload_key(owner_id: &str, upload_id: &str, filename: &str) -> String {
    format!(
        "uploads/{}/{}/{}",
        sanitize_filename(owner_id),
        upload_id,
        sanitize_filename(filename)
    )
}
