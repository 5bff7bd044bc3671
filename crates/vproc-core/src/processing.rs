//! Single entry point bundling every use case.

use vproc_models::{Outcome, RequestId, RequestSummary, StatusView};

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::policy::UploadPolicy;
use crate::services::{
    Collaborators, DownloadGrant, DownloadService, QueryService, RetryService, StatusChange,
    StatusUpdate, StatusUpdateService, SubmitReceipt, SubmitService, SubmitUpload,
};

/// The processing core wired to one set of collaborators.
#[derive(Clone)]
pub struct ProcessingCore {
    submit: SubmitService,
    status: StatusUpdateService,
    download: DownloadService,
    queries: QueryService,
    retry: RetryService,
}

impl ProcessingCore {
    pub fn new(config: &CoreConfig, collaborators: Collaborators) -> Self {
        Self {
            submit: SubmitService::new(UploadPolicy::from_config(config), &collaborators),
            status: StatusUpdateService::new(&collaborators),
            download: DownloadService::new(config.download_url_expiry_minutes, &collaborators),
            queries: QueryService::new(&collaborators),
            retry: RetryService::new(config.retry_delay_secs, &collaborators),
        }
    }

    pub async fn submit(&self, upload: SubmitUpload) -> CoreResult<Outcome<SubmitReceipt>> {
        self.submit.submit(upload).await
    }

    pub async fn update_status(&self, update: StatusUpdate) -> CoreResult<Outcome<StatusChange>> {
        self.status.update_status(update).await
    }

    pub async fn authorize_download(
        &self,
        request_id: &RequestId,
        requester_id: &str,
    ) -> CoreResult<Outcome<DownloadGrant>> {
        self.download.authorize(request_id, requester_id).await
    }

    pub async fn get_status(&self, request_id: &RequestId, owner_id: &str) -> CoreResult<StatusView> {
        self.queries.get_status(request_id, owner_id).await
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> CoreResult<Vec<RequestSummary>> {
        self.queries.list_by_owner(owner_id).await
    }

    pub async fn retry(&self, request_id: &RequestId, owner_id: &str) -> CoreResult<Outcome<StatusChange>> {
        self.retry.retry(request_id, owner_id).await
    }
}
