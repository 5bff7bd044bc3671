//! Notification channel port and simple implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::NotifyResult;
use crate::event::{NotificationEvent, TemplateData};

/// Delivers notifications to request owners.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `event` to `owner_id`, returning the notification ID.
    async fn send(
        &self,
        owner_id: &str,
        event: NotificationEvent,
        data: &TemplateData,
    ) -> NotifyResult<String>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        owner_id: &str,
        event: NotificationEvent,
        data: &TemplateData,
    ) -> NotifyResult<String> {
        let id = Uuid::new_v4().to_string();
        info!(
            notification_id = %id,
            owner_id = %owner_id,
            event = %event,
            "{}: {}",
            event.subject(),
            serde_json::to_string(data).unwrap_or_default()
        );
        Ok(id)
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub id: String,
    pub owner_id: String,
    pub event: NotificationEvent,
    pub data: TemplateData,
    pub sent_at: DateTime<Utc>,
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }

    /// Events sent so far, in order.
    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.sent.lock().await.iter().map(|n| n.event).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        owner_id: &str,
        event: NotificationEvent,
        data: &TemplateData,
    ) -> NotifyResult<String> {
        let id = Uuid::new_v4().to_string();
        self.sent.lock().await.push(SentNotification {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            event,
            data: data.clone(),
            sent_at: Utc::now(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        let data = TemplateData::new().with("filename", "clip.mp4");

        let id = notifier
            .send("u1", NotificationEvent::UploadConfirmed, &data)
            .await
            .unwrap();

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, id);
        assert_eq!(sent[0].owner_id, "u1");
        assert_eq!(sent[0].data.get_str("filename"), Some("clip.mp4"));
    }

    #[tokio::test]
    async fn test_log_notifier_returns_id() {
        let id = LogNotifier
            .send("u1", NotificationEvent::ProcessingStarted, &TemplateData::new())
            .await
            .unwrap();
        assert!(!id.is_empty());
    }
}
