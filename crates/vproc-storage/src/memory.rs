//! In-memory object storage.
//!
//! Used for local runs and tests. Download URLs carry an HMAC-signed
//! [`DownloadToken`] so they expire like real presigned URLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::storage::{clamp_expiry_minutes, ObjectInfo, ObjectStorage};
use crate::token::DownloadToken;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    stored_at: DateTime<Utc>,
}

impl StoredObject {
    fn info(&self, key: &str) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            size_bytes: self.data.len() as u64,
            content_type: self.content_type.clone(),
            stored_at: self.stored_at,
        }
    }
}

/// Object storage backed by a `HashMap`.
pub struct InMemoryStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    base_url: String,
    signing_secret: String,
    unavailable: AtomicBool,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new("memory://objects", "local-dev-secret")
    }
}

impl InMemoryStorage {
    pub fn new(base_url: impl Into<String>, signing_secret: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signing_secret: signing_secret.into(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate an outage: every operation fails until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Put an object directly, bypassing size checks (seeding processed artifacts).
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                stored_at: Utc::now(),
            },
        );
    }

    /// Read back an object's bytes.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Verify a URL minted by [`ObjectStorage::generate_download_url`] and
    /// return the object key it grants access to.
    pub fn verify_download_url(&self, url: &str) -> StorageResult<Option<String>> {
        let Some((_, signed)) = url.split_once("?token=") else {
            return Ok(None);
        };
        Ok(DownloadToken::verify(signed, &self.signing_secret)?.map(|t| t.key))
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("in-memory storage switched off"));
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() || key.split('/').any(|part| part == "..") {
        return Err(StorageError::invalid_key(key));
    }
    Ok(())
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        name: &str,
        content_type: &str,
        size_bytes: u64,
    ) -> StorageResult<String> {
        self.check_available()?;
        validate_key(name)?;

        if data.len() as u64 != size_bytes {
            return Err(StorageError::upload_failed(format!(
                "declared size {} does not match {} received bytes",
                size_bytes,
                data.len()
            )));
        }

        debug!("Storing {} bytes at {}", size_bytes, name);
        self.put(name, data, content_type).await;
        info!("Stored object {}", name);
        Ok(name.to_string())
    }

    async fn generate_download_url(
        &self,
        reference: &str,
        expires_in_minutes: u32,
    ) -> StorageResult<String> {
        self.check_available()?;
        if !self.objects.read().await.contains_key(reference) {
            return Err(StorageError::not_found(reference));
        }

        let token = DownloadToken::new(reference, clamp_expiry_minutes(expires_in_minutes));
        let signed = token
            .sign(&self.signing_secret)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(format!("{}/{}?token={}", self.base_url, reference, signed))
    }

    async fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        self.check_available()?;
        validate_key(destination)?;

        let mut objects = self.objects.write().await;
        let object = objects
            .get(source)
            .cloned()
            .ok_or_else(|| StorageError::not_found(source))?;
        objects.insert(
            destination.to_string(),
            StoredObject {
                stored_at: Utc::now(),
                ..object
            },
        );
        debug!("Copied {} to {}", source, destination);
        Ok(())
    }

    async fn metadata(&self, reference: &str) -> StorageResult<Option<ObjectInfo>> {
        self.check_available()?;
        Ok(self
            .objects
            .read()
            .await
            .get(reference)
            .map(|o| o.info(reference)))
    }
}
