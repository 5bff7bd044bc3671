//! Use-case services.
//!
//! Each service is handed the collaborators it needs at construction and
//! keeps no other state. Aggregates are loaded fresh on every call, so the
//! transition guard always runs against what the store currently holds.

mod download;
mod queries;
mod retry;
mod submit;
mod update_status;

pub use download::{DownloadGrant, DownloadService};
pub use queries::QueryService;
pub use retry::RetryService;
pub use submit::{SubmitReceipt, SubmitService, SubmitUpload};
pub use update_status::{StatusChange, StatusUpdate, StatusUpdateService};

use std::sync::Arc;

use tracing::{debug, warn};

use vproc_models::{ProcessingRequest, RequestId};
use vproc_notify::{NotificationEvent, Notifier, TemplateData};
use vproc_queue::JobQueue;
use vproc_storage::ObjectStorage;
use vproc_store::RequestRepository;

use crate::detect::ContentTypeDetector;
use crate::error::{CoreError, CoreResult};
use crate::metrics;
use crate::owners::OwnerDirectory;

/// Every external collaborator the core talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn ObjectStorage>,
    pub queue: Arc<dyn JobQueue>,
    pub repository: Arc<dyn RequestRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub detector: Arc<dyn ContentTypeDetector>,
    pub owners: Arc<dyn OwnerDirectory>,
}

/// Load a request, optionally enforcing ownership.
///
/// A missing request and one owned by someone else produce the same
/// [`CoreError::NotFound`].
pub(crate) async fn load_request(
    repository: &dyn RequestRepository,
    id: &RequestId,
    owner_id: Option<&str>,
) -> CoreResult<ProcessingRequest> {
    let request = repository.find_by_id(id).await?.ok_or_else(|| {
        debug!(request_id = %id, "Processing request does not exist");
        CoreError::NotFound
    })?;

    if let Some(owner_id) = owner_id {
        if !request.is_owned_by(owner_id) {
            debug!(request_id = %id, owner_id = %owner_id, "Ownership check failed");
            return Err(CoreError::NotFound);
        }
    }

    Ok(request)
}

/// Template data shared by all request notifications.
pub(crate) fn request_template(request: &ProcessingRequest) -> TemplateData {
    TemplateData::new()
        .with("request_id", request.id().as_str())
        .with("filename", request.metadata().original_filename())
        .with("status", request.status().as_str())
        .with("download_ready", request.is_download_ready())
}

/// Send a notification, logging and counting failures instead of
/// returning them.
pub(crate) async fn notify_best_effort(
    notifier: &dyn Notifier,
    request: &ProcessingRequest,
    event: NotificationEvent,
    data: TemplateData,
) {
    match notifier.send(request.owner_id(), event, &data).await {
        Ok(notification_id) => {
            debug!(
                request_id = %request.id(),
                notification_id = %notification_id,
                event = %event,
                "Notification sent"
            );
        }
        Err(e) => {
            warn!(
                request_id = %request.id(),
                owner_id = %request.owner_id(),
                event = %event,
                "Failed to send notification: {}", e
            );
            metrics::record_notification_failed(event.as_str());
        }
    }
}
