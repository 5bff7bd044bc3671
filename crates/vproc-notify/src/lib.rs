//! Owner notification boundary.
//!
//! This crate provides:
//! - Notification event types and template data
//! - The `Notifier` port
//! - A log-only notifier and an in-memory recording notifier

pub mod error;
pub mod event;
pub mod notifier;

pub use error::{NotifyError, NotifyResult};
pub use event::{NotificationEvent, TemplateData};
pub use notifier::{LogNotifier, Notifier, RecordingNotifier, SentNotification};
