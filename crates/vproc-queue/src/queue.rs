//! Job queue port and an in-memory implementation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::QueueResult;
use crate::job::ProcessingJob;

/// Longest delay accepted by the in-memory queue (one year).
const MAX_DELAY_SECS: u64 = 365 * 24 * 60 * 60;

/// Message queue feeding the processing consumer.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Publish a job for immediate delivery, returning the message ID.
    async fn send(&self, job: &ProcessingJob) -> QueueResult<String>;

    /// Publish a job that becomes visible after `delay_secs`.
    async fn send_delayed(&self, job: &ProcessingJob, delay_secs: u64) -> QueueResult<String>;
}

#[derive(Debug, Clone)]
struct QueuedMessage {
    message_id: String,
    payload: String,
    visible_at: DateTime<Utc>,
}

/// FIFO queue held in process memory.
///
/// Jobs are stored as their JSON payload, exactly as a network transport
/// would carry them.
#[derive(Default)]
pub struct InMemoryQueue {
    messages: Mutex<VecDeque<QueuedMessage>>,
    next_seq: AtomicU64,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    async fn push(&self, job: &ProcessingJob, delay_secs: u64) -> QueueResult<String> {
        let payload = serde_json::to_string(job)?;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let message_id = format!("{}-{}", Utc::now().timestamp_millis(), seq);
        let delay = Duration::seconds(delay_secs.min(MAX_DELAY_SECS) as i64);

        self.messages.lock().await.push_back(QueuedMessage {
            message_id: message_id.clone(),
            payload,
            visible_at: Utc::now() + delay,
        });

        info!(
            request_id = %job.request_id,
            attempt = job.attempt,
            delay_secs,
            "Enqueued job {} with message ID {}",
            job.idempotency_key(),
            message_id
        );
        Ok(message_id)
    }

    /// Remove and return every job whose delay has elapsed, in send order.
    pub async fn drain_ready(&self) -> Vec<(String, ProcessingJob)> {
        let now = Utc::now();
        let mut messages = self.messages.lock().await;
        let mut ready = Vec::new();
        let mut waiting = VecDeque::new();

        while let Some(message) = messages.pop_front() {
            if message.visible_at > now {
                waiting.push_back(message);
                continue;
            }
            match serde_json::from_str::<ProcessingJob>(&message.payload) {
                Ok(job) => {
                    debug!("Consumed job {} from queue", job.request_id);
                    ready.push((message.message_id, job));
                }
                Err(e) => warn!("Dropping malformed job payload {}: {}", message.message_id, e),
            }
        }

        *messages = waiting;
        ready
    }

    /// Number of messages still held, including delayed ones.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn send(&self, job: &ProcessingJob) -> QueueResult<String> {
        self.push(job, 0).await
    }

    async fn send_delayed(&self, job: &ProcessingJob, delay_secs: u64) -> QueueResult<String> {
        self.push(job, delay_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vproc_models::{FileMetadata, ProcessingRequest};

    fn job(name: &str) -> ProcessingJob {
        let meta = FileMetadata::new(name, 5, "video/mp4", format!("uploads/u1/x/{}", name)).unwrap();
        ProcessingJob::for_request(&ProcessingRequest::create("u1", meta))
    }

    #[tokio::test]
    async fn test_send_and_drain_in_order() {
        let queue = InMemoryQueue::new();
        let first = queue.send(&job("a.mp4")).await.unwrap();
        let second = queue.send(&job("b.mp4")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(queue.len().await, 2);

        let drained = queue.drain_ready().await;
        let names: Vec<_> = drained.iter().map(|(_, j)| j.filename.as_str()).collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4"]);
        assert_eq!(drained[0].0, first);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_delayed_jobs_stay_hidden() {
        let queue = InMemoryQueue::new();
        queue.send_delayed(&job("later.mp4"), 3600).await.unwrap();
        queue.send(&job("now.mp4")).await.unwrap();

        let drained = queue.drain_ready().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].1.filename, "now.mp4");
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_payload_round_trips() {
        let queue = InMemoryQueue::new();
        let original = job("clip.mp4").with_param("fps", "2");
        queue.send(&original).await.unwrap();

        let (_, received) = queue.drain_ready().await.remove(0);
        assert_eq!(received, original);
    }
}
