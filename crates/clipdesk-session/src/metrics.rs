//! Session metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Jobs submitted to the engine.
    pub const JOBS_SUBMITTED_TOTAL: &str = "clipdesk_jobs_submitted_total";

    /// Jobs reaching a terminal state, by outcome.
    pub const JOB_OUTCOMES_TOTAL: &str = "clipdesk_job_outcomes_total";

    /// Clips announced by the engine.
    pub const CLIPS_RECEIVED_TOTAL: &str = "clipdesk_clips_received_total";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

/// Record a terminal outcome (`succeeded`, `failed`, `cancelled`).
pub fn record_job_outcome(outcome: &'static str) {
    counter!(names::JOB_OUTCOMES_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_clip_received() {
    counter!(names::CLIPS_RECEIVED_TOTAL).increment(1);
}
