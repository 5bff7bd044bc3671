//! Download authorization.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use vproc_models::{Outcome, Rejection, RequestId};
use vproc_storage::{clamp_expiry_minutes, ObjectStorage};
use vproc_store::RequestRepository;

use super::{load_request, Collaborators};
use crate::error::{CoreError, CoreResult};
use crate::metrics;

/// A time-limited permission to fetch a processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadGrant {
    pub request_id: RequestId,
    pub filename: String,
    pub url: String,
    pub expires_in_minutes: u32,
    pub expires_at: DateTime<Utc>,
}

/// Mints download URLs for finished requests.
#[derive(Clone)]
pub struct DownloadService {
    expiry_minutes: u32,
    repository: Arc<dyn RequestRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl DownloadService {
    pub fn new(expiry_minutes: u32, collaborators: &Collaborators) -> Self {
        Self {
            expiry_minutes: clamp_expiry_minutes(expiry_minutes),
            repository: collaborators.repository.clone(),
            storage: collaborators.storage.clone(),
        }
    }

    /// Authorize `requester_id` to download the result of `request_id`.
    pub async fn authorize(
        &self,
        request_id: &RequestId,
        requester_id: &str,
    ) -> CoreResult<Outcome<DownloadGrant>> {
        let request = load_request(self.repository.as_ref(), request_id, Some(requester_id)).await?;

        if !request.is_download_ready() {
            info!(
                request_id = %request_id,
                status = %request.status(),
                "Download requested before result is ready"
            );
            return Ok(Outcome::failure(Rejection::NotReady {
                status: request.status(),
            }));
        }

        let Some(reference) = request.processed_file_ref() else {
            return Err(CoreError::internal("download-ready request has no processed file"));
        };

        let url = self
            .storage
            .generate_download_url(reference, self.expiry_minutes)
            .await?;
        let expires_at = Utc::now() + Duration::minutes(i64::from(self.expiry_minutes));

        metrics::record_download_authorized();
        info!(request_id = %request_id, "Download authorized");

        Ok(Outcome::success(DownloadGrant {
            request_id: request.id().clone(),
            filename: request.metadata().original_filename().to_string(),
            url,
            expires_in_minutes: self.expiry_minutes,
            expires_at,
        }))
    }
}
