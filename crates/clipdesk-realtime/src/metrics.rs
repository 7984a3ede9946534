//! Channel metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the binary.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Connection attempts, initial and reconnects alike.
    pub const CONNECTION_ATTEMPTS_TOTAL: &str = "clipdesk_channel_connection_attempts_total";

    /// Reconnects scheduled after the channel dropped or failed to open.
    pub const RECONNECTS_SCHEDULED_TOTAL: &str = "clipdesk_channel_reconnects_scheduled_total";

    /// Text frames received.
    pub const FRAMES_RECEIVED_TOTAL: &str = "clipdesk_channel_frames_received_total";

    /// Frames dropped by reason.
    pub const FRAMES_DROPPED_TOTAL: &str = "clipdesk_channel_frames_dropped_total";
}

pub fn record_connection_attempt() {
    counter!(names::CONNECTION_ATTEMPTS_TOTAL).increment(1);
}

pub fn record_reconnect_scheduled() {
    counter!(names::RECONNECTS_SCHEDULED_TOTAL).increment(1);
}

pub fn record_frame_received() {
    counter!(names::FRAMES_RECEIVED_TOTAL).increment(1);
}

/// Record a dropped frame, labelled with a short reason.
pub fn record_frame_dropped(reason: &'static str) {
    counter!(names::FRAMES_DROPPED_TOTAL, "reason" => reason).increment(1);
}
