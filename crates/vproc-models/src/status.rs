//! Processing status and the lifecycle transition table.
//!
//! ```text
//! Pending ──> Processing ──> Completed
//!    │             │
//!    └──> Failed <─┘
//!           │
//!           └──(retry)──> Pending
//! ```
//!
//! `Completed` and `Failed` are terminal. The only edge leaving a terminal
//! state is the explicit `Failed -> Pending` retry.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Accepted and queued, waiting for the consumer
    #[default]
    Pending,
    /// Picked up by the consumer
    Processing,
    /// Processed artifact is available
    Completed,
    /// Processing failed (may be retried)
    Failed,
}

/// Legal `(from, to)` edges.
const TRANSITIONS: &[(ProcessingStatus, ProcessingStatus)] = &[
    (ProcessingStatus::Pending, ProcessingStatus::Processing),
    (ProcessingStatus::Pending, ProcessingStatus::Failed),
    (ProcessingStatus::Processing, ProcessingStatus::Completed),
    (ProcessingStatus::Processing, ProcessingStatus::Failed),
    (ProcessingStatus::Failed, ProcessingStatus::Pending),
];

impl ProcessingStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ProcessingStatus; 4] = [
        ProcessingStatus::Pending,
        ProcessingStatus::Processing,
        ProcessingStatus::Completed,
        ProcessingStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Human readable description, suitable for status pages.
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "Waiting to be processed",
            ProcessingStatus::Processing => "Video is being processed",
            ProcessingStatus::Completed => "Processing finished, ready for download",
            ProcessingStatus::Failed => "Processing failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    /// Check whether moving from `self` to `target` is a legal edge.
    pub fn can_transition_to(&self, target: ProcessingStatus) -> bool {
        can_transition(*self, target)
    }

    /// Statuses reachable from `self` in one step.
    pub fn next_states(&self) -> Vec<ProcessingStatus> {
        TRANSITIONS
            .iter()
            .filter(|(from, _)| from == self)
            .map(|(_, to)| *to)
            .collect()
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pure lookup against the transition table.
pub fn can_transition(current: ProcessingStatus, target: ProcessingStatus) -> bool {
    TRANSITIONS
        .iter()
        .any(|&(from, to)| from == current && to == target)
}

/// True for `Completed` and `Failed`.
pub fn is_terminal(status: ProcessingStatus) -> bool {
    status.is_terminal()
}
