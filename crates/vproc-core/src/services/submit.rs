//! Submit use case: validate, store, persist, enqueue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use vproc_models::{
    FileMetadata, Outcome, ProcessingRequest, ProcessingStatus, Rejection, RequestId,
};
use vproc_notify::{NotificationEvent, Notifier};
use vproc_queue::{JobQueue, ProcessingJob};
use vproc_storage::{upload_key, ObjectStorage};
use vproc_store::RequestRepository;

use super::{notify_best_effort, request_template, Collaborators};
use crate::detect::ContentTypeDetector;
use crate::error::CoreResult;
use crate::logging::RequestLogger;
use crate::metrics;
use crate::owners::OwnerDirectory;
use crate::policy::UploadPolicy;

/// An upload handed to the core by the transport layer.
#[derive(Debug, Clone)]
pub struct SubmitUpload {
    pub owner_id: String,
    pub filename: String,
    /// Content type claimed by the client
    pub content_type: String,
    /// Byte length claimed by the client
    pub size_bytes: u64,
    pub data: Vec<u8>,
}

impl SubmitUpload {
    /// Create an upload whose declared size is the length of `data`.
    pub fn new(
        owner_id: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            size_bytes: data.len() as u64,
            data,
        }
    }

    /// Override the declared size (e.g. from a `Content-Length` header).
    pub fn with_declared_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }
}

/// Returned for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub request_id: RequestId,
    pub status: ProcessingStatus,
    pub message: String,
}

/// Accepts new uploads.
#[derive(Clone)]
pub struct SubmitService {
    policy: UploadPolicy,
    storage: Arc<dyn ObjectStorage>,
    queue: Arc<dyn JobQueue>,
    repository: Arc<dyn RequestRepository>,
    notifier: Arc<dyn Notifier>,
    detector: Arc<dyn ContentTypeDetector>,
    owners: Arc<dyn OwnerDirectory>,
}

impl SubmitService {
    pub fn new(policy: UploadPolicy, collaborators: &Collaborators) -> Self {
        Self {
            policy,
            storage: collaborators.storage.clone(),
            queue: collaborators.queue.clone(),
            repository: collaborators.repository.clone(),
            notifier: collaborators.notifier.clone(),
            detector: collaborators.detector.clone(),
            owners: collaborators.owners.clone(),
        }
    }

    /// Validate and accept an upload.
    ///
    /// Validation failures and inactive owners come back as
    /// `Outcome::Failure` with nothing stored. Once the request is persisted
    /// it stays visible even if publishing the job fails afterwards.
    pub async fn submit(&self, upload: SubmitUpload) -> CoreResult<Outcome<SubmitReceipt>> {
        let SubmitUpload {
            owner_id,
            filename,
            content_type,
            size_bytes,
            data,
        } = upload;

        let content_type = match self.validate(&filename, &content_type, size_bytes, &data) {
            Ok(detected) => detected,
            Err(rejection) => return Ok(self.reject(&owner_id, &filename, rejection)),
        };

        if !self.owners.is_active(&owner_id).await? {
            return Ok(self.reject(&owner_id, &filename, Rejection::OwnerInactive));
        }

        let actual_size = data.len() as u64;
        let key = upload_key(&owner_id, &Uuid::new_v4().to_string(), &filename);
        let storage_ref = self
            .storage
            .store(data, &key, &content_type, actual_size)
            .await?;

        let metadata = FileMetadata::new(&filename, actual_size, &content_type, storage_ref)?;
        let request = ProcessingRequest::create(&owner_id, metadata);
        let request = self.repository.save(&request).await?;

        let logger = RequestLogger::new(request.id(), "submit");
        logger.log_start(&format!("{} ({} bytes)", filename, actual_size));

        let job = ProcessingJob::for_request(&request);
        let message_id = self.queue.send(&job).await.map_err(|e| {
            error!(
                request_id = %request.id(),
                "Request persisted but job could not be published: {}", e
            );
            e
        })?;
        info!(
            request_id = %request.id(),
            message_id = %message_id,
            idempotency_key = %job.idempotency_key(),
            "Enqueued processing job"
        );

        notify_best_effort(
            self.notifier.as_ref(),
            &request,
            NotificationEvent::UploadConfirmed,
            request_template(&request),
        )
        .await;

        metrics::record_submission_accepted();
        logger.log_completion("upload accepted");

        Ok(Outcome::success(SubmitReceipt {
            request_id: request.id().clone(),
            status: request.status(),
            message: "Upload accepted; processing will start shortly".to_string(),
        }))
    }

    /// Run the upload rules in order, returning the detected content type.
    fn validate(
        &self,
        filename: &str,
        declared_type: &str,
        declared_size: u64,
        data: &[u8],
    ) -> Result<String, Rejection> {
        self.policy.check_size(declared_size, data.len() as u64)?;
        self.policy.check_extension(filename)?;

        let detected = self.detector.detect(data, filename, declared_type);
        self.policy.check_content_type(declared_type, &detected)?;
        Ok(crate::detect::normalize_content_type(&detected))
    }

    fn reject(&self, owner_id: &str, filename: &str, rejection: Rejection) -> Outcome<SubmitReceipt> {
        info!(
            owner_id = %owner_id,
            filename = %filename,
            code = rejection.code(),
            "Upload rejected: {}", rejection
        );
        metrics::record_submission_rejected(rejection.code());
        Outcome::failure(rejection)
    }
}
