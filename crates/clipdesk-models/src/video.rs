//! Source video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Title and duration reported by the engine's metadata probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(rename = "duration", alias = "durationSeconds")]
    pub duration_seconds: f64,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            title: title.into(),
            duration_seconds,
        }
    }

    /// Duration as `H:MM:SS` (or `M:SS` under an hour).
    pub fn duration_label(&self) -> String {
        let total = self.duration_seconds.max(0.0).round() as u64;
        let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
        if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        }
    }
}
