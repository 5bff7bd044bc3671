//! Durable storage for processing requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use vproc_models::{ProcessingRequest, RequestId};

use crate::error::{RepoError, RepoResult};

/// Durable store for [`ProcessingRequest`] aggregates.
///
/// Implementations must be read-your-writes consistent for a single id.
/// Concurrent writers to the same id are arbitrated by the store itself.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert or replace a request, returning what was stored.
    async fn save(&self, request: &ProcessingRequest) -> RepoResult<ProcessingRequest>;

    /// Get a request by ID.
    async fn find_by_id(&self, id: &RequestId) -> RepoResult<Option<ProcessingRequest>>;

    /// All requests belonging to `owner_id`, in no particular order.
    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<ProcessingRequest>>;
}

/// Repository held in process memory.
///
/// Requests are kept as JSON documents so every read hands out a fresh copy,
/// the same way a document database would.
#[derive(Default)]
pub struct InMemoryRequestRepository {
    documents: RwLock<HashMap<String, serde_json::Value>>,
    unavailable: AtomicBool,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every operation fails until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::unavailable("in-memory store switched off"));
        }
        Ok(())
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn save(&self, request: &ProcessingRequest) -> RepoResult<ProcessingRequest> {
        self.check_available()?;
        let doc = serde_json::to_value(request)?;

        let previous = self
            .documents
            .write()
            .await
            .insert(request.id().as_str().to_string(), doc);

        if previous.is_none() {
            info!(request_id = %request.id(), "Created request record");
        } else {
            debug!(request_id = %request.id(), status = %request.status(), "Updated request record");
        }
        Ok(request.clone())
    }

    async fn find_by_id(&self, id: &RequestId) -> RepoResult<Option<ProcessingRequest>> {
        self.check_available()?;
        let documents = self.documents.read().await;

        documents
            .get(id.as_str())
            .map(|doc| serde_json::from_value(doc.clone()).map_err(RepoError::from))
            .transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<ProcessingRequest>> {
        self.check_available()?;
        let documents = self.documents.read().await;

        documents
            .values()
            .filter(|doc| doc.get("owner_id").and_then(|v| v.as_str()) == Some(owner_id))
            .map(|doc| {
                serde_json::from_value(doc.clone())
                    .map_err(|e| RepoError::SerializationError(e.to_string()))
            })
            .collect()
    }
}
