//! Update-status use case, driven by the processing consumer or the owner.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vproc_models::{Outcome, ProcessingRequest, ProcessingStatus, Rejection, RequestId};
use vproc_notify::{NotificationEvent, Notifier};
use vproc_store::RequestRepository;

use super::{load_request, notify_best_effort, request_template, Collaborators};
use crate::error::CoreResult;
use crate::logging::RequestLogger;
use crate::metrics;

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub request_id: RequestId,
    pub target: ProcessingStatus,
    /// Required when `target` is `Completed`
    pub processed_file_ref: Option<String>,
    /// Required when `target` is `Failed`
    pub error_message: Option<String>,
    /// Caller identity; `None` for trusted internal callers
    pub owner_id: Option<String>,
}

impl StatusUpdate {
    pub fn new(request_id: RequestId, target: ProcessingStatus) -> Self {
        Self {
            request_id,
            target,
            processed_file_ref: None,
            error_message: None,
            owner_id: None,
        }
    }

    pub fn processing(request_id: RequestId) -> Self {
        Self::new(request_id, ProcessingStatus::Processing)
    }

    pub fn completed(request_id: RequestId, processed_file_ref: impl Into<String>) -> Self {
        Self {
            processed_file_ref: Some(processed_file_ref.into()),
            ..Self::new(request_id, ProcessingStatus::Completed)
        }
    }

    pub fn failed(request_id: RequestId, error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::new(request_id, ProcessingStatus::Failed)
        }
    }

    /// Back to pending. Does not re-publish the job; see `RetryService`.
    pub fn pending(request_id: RequestId) -> Self {
        Self::new(request_id, ProcessingStatus::Pending)
    }

    /// Restrict the update to requests owned by `owner_id`.
    pub fn by_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }
}

/// Status before and after an applied update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub previous: ProcessingStatus,
    pub current: ProcessingStatus,
}

/// Applies status updates through the aggregate's transition guard.
#[derive(Clone)]
pub struct StatusUpdateService {
    repository: Arc<dyn RequestRepository>,
    notifier: Arc<dyn Notifier>,
}

impl StatusUpdateService {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            repository: collaborators.repository.clone(),
            notifier: collaborators.notifier.clone(),
        }
    }

    /// Apply `update`.
    ///
    /// Unknown or foreign requests are faults. Disallowed transitions and
    /// missing fields are returned as `Outcome::Failure` and leave the
    /// stored request untouched, which is also how duplicate deliveries of
    /// the same update are absorbed.
    pub async fn update_status(&self, update: StatusUpdate) -> CoreResult<Outcome<StatusChange>> {
        let mut request = load_request(
            self.repository.as_ref(),
            &update.request_id,
            update.owner_id.as_deref(),
        )
        .await?;

        let logger = RequestLogger::new(request.id(), "update_status");
        let previous = request.status();

        if let Err(rejection) = apply(&mut request, &update) {
            logger.log_rejected(&rejection.to_string());
            metrics::record_transition_rejected(rejection.code());
            return Ok(Outcome::failure(rejection));
        }

        let request = self.repository.save(&request).await?;
        metrics::record_transition(previous, request.status());
        logger.log_completion(&format!("{} -> {}", previous, request.status()));

        if let Some(event) = event_for(request.status()) {
            let mut data = request_template(&request);
            if let Some(reason) = request.error_message() {
                data = data.with("reason", reason);
            }
            notify_best_effort(self.notifier.as_ref(), &request, event, data).await;
        }

        Ok(Outcome::success(StatusChange {
            previous,
            current: request.status(),
        }))
    }
}

fn apply(request: &mut ProcessingRequest, update: &StatusUpdate) -> Result<(), Rejection> {
    match update.target {
        ProcessingStatus::Pending => request.retry(),
        ProcessingStatus::Processing => request.start_processing(),
        ProcessingStatus::Completed => {
            request.mark_completed(update.processed_file_ref.clone().unwrap_or_default())
        }
        ProcessingStatus::Failed => {
            request.mark_failed(update.error_message.clone().unwrap_or_default())
        }
    }
}

fn event_for(status: ProcessingStatus) -> Option<NotificationEvent> {
    match status {
        ProcessingStatus::Pending => None,
        ProcessingStatus::Processing => Some(NotificationEvent::ProcessingStarted),
        ProcessingStatus::Completed => Some(NotificationEvent::ProcessingCompleted),
        ProcessingStatus::Failed => Some(NotificationEvent::ProcessingFailed),
    }
}
