//! Notification event types and template data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kinds of notification sent to request owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationEvent {
    /// Upload accepted and queued
    UploadConfirmed,
    /// Consumer started processing
    ProcessingStarted,
    /// Processed file is ready for download
    ProcessingCompleted,
    /// Processing failed
    ProcessingFailed,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::UploadConfirmed => "upload-confirmed",
            NotificationEvent::ProcessingStarted => "processing-started",
            NotificationEvent::ProcessingCompleted => "processing-completed",
            NotificationEvent::ProcessingFailed => "processing-failed",
        }
    }

    /// Default subject line for this event.
    pub fn subject(&self) -> &'static str {
        match self {
            NotificationEvent::UploadConfirmed => "Upload received",
            NotificationEvent::ProcessingStarted => "Processing started",
            NotificationEvent::ProcessingCompleted => "Your video is ready",
            NotificationEvent::ProcessingFailed => "Processing failed",
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key/value data rendered into a notification template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateData(Map<String, Value>);

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(NotificationEvent::UploadConfirmed.as_str(), "upload-confirmed");
        assert_eq!(
            serde_json::to_string(&NotificationEvent::ProcessingFailed).unwrap(),
            "\"processing-failed\""
        );
    }

    #[test]
    fn test_template_data() {
        let data = TemplateData::new()
            .with("filename", "clip.mp4")
            .with("download_ready", true);

        assert_eq!(data.get_str("filename"), Some("clip.mp4"));
        assert_eq!(data.get("download_ready"), Some(&Value::Bool(true)));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({ "filename": "clip.mp4", "download_ready": true })
        );
    }
}
