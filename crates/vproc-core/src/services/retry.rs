//! Owner-invoked retry of a failed request.

use std::sync::Arc;

use tracing::info;

use vproc_models::{Outcome, RequestId};
use vproc_queue::{JobQueue, ProcessingJob};
use vproc_store::RequestRepository;

use super::{load_request, Collaborators, StatusChange};
use crate::error::CoreResult;
use crate::logging::RequestLogger;
use crate::metrics;

/// Moves failed requests back to pending and re-publishes their job.
#[derive(Clone)]
pub struct RetryService {
    retry_delay_secs: u64,
    repository: Arc<dyn RequestRepository>,
    queue: Arc<dyn JobQueue>,
}

impl RetryService {
    pub fn new(retry_delay_secs: u64, collaborators: &Collaborators) -> Self {
        Self {
            retry_delay_secs,
            repository: collaborators.repository.clone(),
            queue: collaborators.queue.clone(),
        }
    }

    /// Retry `request_id` on behalf of `owner_id`.
    ///
    /// Only failed requests can be retried; anything else is an
    /// illegal-transition outcome. A queue failure after the request has
    /// been saved as pending is a fault.
    pub async fn retry(&self, request_id: &RequestId, owner_id: &str) -> CoreResult<Outcome<StatusChange>> {
        let mut request = load_request(self.repository.as_ref(), request_id, Some(owner_id)).await?;
        let logger = RequestLogger::new(request.id(), "retry");
        let previous = request.status();

        if let Err(rejection) = request.retry() {
            logger.log_rejected(&rejection.to_string());
            metrics::record_transition_rejected(rejection.code());
            return Ok(Outcome::failure(rejection));
        }

        let request = self.repository.save(&request).await?;
        metrics::record_transition(previous, request.status());

        let job = ProcessingJob::for_request(&request).with_attempt(request.retry_count() + 1);
        let message_id = if self.retry_delay_secs > 0 {
            self.queue.send_delayed(&job, self.retry_delay_secs).await?
        } else {
            self.queue.send(&job).await?
        };
        info!(
            request_id = %request.id(),
            message_id = %message_id,
            attempt = job.attempt,
            delay_secs = self.retry_delay_secs,
            "Re-enqueued processing job"
        );
        logger.log_completion(&format!("retry #{}", request.retry_count()));

        Ok(Outcome::success(StatusChange {
            previous,
            current: request.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vproc_models::{FileMetadata, ProcessingRequest, ProcessingStatus};
    use vproc_queue::QueueError;

    use super::*;
    use crate::services::testing::{Harness, MockQueue};

    async fn seed_failed(harness: &Harness) -> RequestId {
        let meta = FileMetadata::new("clip.mp4", 10, "video/mp4", "uploads/x/clip.mp4").unwrap();
        let mut request = ProcessingRequest::create("u1", meta);
        request.mark_failed("decoder crashed").unwrap();
        harness.repository.save(&request).await.unwrap();
        request.id().clone()
    }

    #[tokio::test]
    async fn test_retry_requeues_with_next_attempt() {
        let harness = Harness::new();
        let svc = RetryService::new(0, &harness.collaborators);
        let id = seed_failed(&harness).await;

        let outcome = svc.retry(&id, "u1").await.unwrap();
        assert_eq!(
            outcome.value(),
            Some(&StatusChange {
                previous: ProcessingStatus::Failed,
                current: ProcessingStatus::Pending
            })
        );

        let stored = harness.repository.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ProcessingStatus::Pending);
        assert!(stored.error_message().is_none());

        let jobs = harness.queue.drain_ready().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].1.attempt, 2);
        assert_eq!(jobs[0].1.idempotency_key(), format!("process:{}:2", id));
    }

    #[tokio::test]
    async fn test_retry_with_delay_uses_delayed_send() {
        let mut harness = Harness::new();
        let mut queue = MockQueue::new();
        queue.expect_send().never();
        queue
            .expect_send_delayed()
            .withf(|job, delay| job.attempt == 2 && *delay == 30)
            .times(1)
            .returning(|_, _| Ok("msg-1".to_string()));
        harness.collaborators.queue = Arc::new(queue);

        let svc = RetryService::new(30, &harness.collaborators);
        let id = seed_failed(&harness).await;
        assert!(svc.retry(&id, "u1").await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_retry_of_non_failed_request_is_rejected() {
        let harness = Harness::new();
        let svc = RetryService::new(0, &harness.collaborators);
        let meta = FileMetadata::new("clip.mp4", 10, "video/mp4", "uploads/x/clip.mp4").unwrap();
        let request = ProcessingRequest::create("u1", meta);
        harness.repository.save(&request).await.unwrap();

        let outcome = svc.retry(request.id(), "u1").await.unwrap();
        assert_eq!(outcome.rejection().unwrap().code(), "illegal_transition");
        assert!(harness.queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_retry_by_other_owner_is_not_found() {
        let harness = Harness::new();
        let svc = RetryService::new(0, &harness.collaborators);
        let id = seed_failed(&harness).await;

        assert!(svc.retry(&id, "u2").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_queue_failure_is_a_fault() {
        let mut harness = Harness::new();
        let mut queue = MockQueue::new();
        queue
            .expect_send()
            .returning(|_| Err(QueueError::connection_failed("broker down")));
        harness.collaborators.queue = Arc::new(queue);

        let svc = RetryService::new(0, &harness.collaborators);
        let id = seed_failed(&harness).await;
        assert!(svc.retry(&id, "u1").await.is_err());
    }
}
