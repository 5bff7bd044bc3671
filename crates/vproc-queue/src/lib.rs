//! Processing job queue boundary.
//!
//! This crate provides:
//! - The `ProcessingJob` message schema
//! - The `JobQueue` port (immediate and delayed send)
//! - An in-memory queue for local runs and tests

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::ProcessingJob;
pub use queue::{InMemoryQueue, JobQueue};
