//! Counters for the processing lifecycle.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::counter;

use vproc_models::ProcessingStatus;

/// Metric names as constants for consistency.
pub mod names {
    // Submissions
    pub const SUBMISSIONS_ACCEPTED_TOTAL: &str = "vproc_submissions_accepted_total";
    pub const SUBMISSIONS_REJECTED_TOTAL: &str = "vproc_submissions_rejected_total";

    // Status changes
    pub const TRANSITIONS_TOTAL: &str = "vproc_status_transitions_total";
    pub const TRANSITIONS_REJECTED_TOTAL: &str = "vproc_status_transitions_rejected_total";

    // Downloads
    pub const DOWNLOADS_AUTHORIZED_TOTAL: &str = "vproc_downloads_authorized_total";

    // Notifications
    pub const NOTIFICATIONS_FAILED_TOTAL: &str = "vproc_notifications_failed_total";
}

pub fn record_submission_accepted() {
    counter!(names::SUBMISSIONS_ACCEPTED_TOTAL).increment(1);
}

/// Record a submission rejected with the given rejection code.
pub fn record_submission_rejected(code: &'static str) {
    counter!(names::SUBMISSIONS_REJECTED_TOTAL, "code" => code).increment(1);
}

/// Record an applied status change.
pub fn record_transition(from: ProcessingStatus, to: ProcessingStatus) {
    counter!(
        names::TRANSITIONS_TOTAL,
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_transition_rejected(code: &'static str) {
    counter!(names::TRANSITIONS_REJECTED_TOTAL, "code" => code).increment(1);
}

pub fn record_download_authorized() {
    counter!(names::DOWNLOADS_AUTHORIZED_TOTAL).increment(1);
}

pub fn record_notification_failed(event: &'static str) {
    counter!(names::NOTIFICATIONS_FAILED_TOTAL, "event" => event).increment(1);
}
