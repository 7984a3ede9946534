//! Job parameters, the outbound job request, and the job lifecycle state.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::{StyleConfig, StyleOverride};
use crate::video::VideoMetadata;

/// Job parameters as the user edits them, before style compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct JobParams {
    /// Source video URL
    pub source_url: String,
    /// Friendly label (`1080p`) or literal `WxH`
    pub output_resolution: String,
    pub min_clip_seconds: u32,
    pub max_clip_seconds: u32,
    pub content_genre: String,
    pub focus_mode: String,
    /// Trim start in seconds, kept as typed
    pub trim_start: String,
    /// Trim end in seconds, empty for "until the end"
    pub trim_end: String,
    pub use_stock_footage: bool,
    pub use_multi_speaker_layout: bool,
    /// Encoder bitrate (e.g. `5000k`)
    pub output_bitrate: String,
    pub style: StyleConfig,
}

impl Default for JobParams {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            output_resolution: "1080p".to_string(),
            min_clip_seconds: 15,
            max_clip_seconds: 60,
            content_genre: "Podcast".to_string(),
            focus_mode: "auto-face".to_string(),
            trim_start: "0".to_string(),
            trim_end: String::new(),
            use_stock_footage: false,
            use_multi_speaker_layout: false,
            output_bitrate: "5000k".to_string(),
            style: StyleConfig::default(),
        }
    }
}

impl JobParams {
    /// Create parameters for a source URL with defaults elsewhere.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// Fill fields the user left empty from fetched metadata.
    ///
    /// Returns true when anything changed.
    pub fn apply_metadata_defaults(&mut self, metadata: &VideoMetadata) -> bool {
        if self.trim_end.trim().is_empty() && metadata.duration_seconds > 0.0 {
            self.trim_end = format_seconds(metadata.duration_seconds);
            return true;
        }
        false
    }
}

fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as u64)
    } else {
        seconds.to_string()
    }
}

/// Payload sent to the rendering engine to start a job.
///
/// Field names follow the engine's request schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobRequest {
    #[serde(rename = "url")]
    pub source_url: String,
    /// Preset name, `None` when a custom style is supplied
    #[serde(rename = "style")]
    pub style_preset: Option<String>,
    /// Resolution label as entered
    pub resolution: String,
    /// Literal `WxH`
    pub output_resolution: String,
    #[serde(rename = "min_sec")]
    pub min_clip_seconds: u32,
    #[serde(rename = "max_sec")]
    pub max_clip_seconds: u32,
    #[serde(rename = "content_type")]
    pub content_genre: String,
    #[serde(rename = "focus_region")]
    pub focus_mode: String,
    #[serde(rename = "start_time")]
    pub trim_start: Option<String>,
    #[serde(rename = "end_time")]
    pub trim_end: Option<String>,
    #[serde(rename = "use_b_roll")]
    pub use_stock_footage: bool,
    #[serde(rename = "use_split_screen")]
    pub use_multi_speaker_layout: bool,
    pub caption_size: u32,
    #[serde(rename = "caption_pos")]
    pub caption_position: String,
    pub output_bitrate: String,
    #[serde(rename = "custom_config")]
    pub compiled_style: StyleOverride,
}

/// Final outcome reported by a `status` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Success,
    Error,
    Cancelled,
}

impl TerminalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStatus::Success => "success",
            TerminalStatus::Error => "error",
            TerminalStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TerminalStatus {
    type Err = TerminalStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(TerminalStatus::Success),
            "error" => Ok(TerminalStatus::Error),
            "cancelled" => Ok(TerminalStatus::Cancelled),
            _ => Err(TerminalStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown terminal status: {0}")]
pub struct TerminalStatusParseError(String);

/// A named processing sub-stage with its own progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseProgress {
    pub name: String,
    pub text: String,
    /// Fraction 0.0..=1.0
    pub progress: f64,
}

/// Job lifecycle state, owned by the session state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    FetchingMetadata,
    Submitting,
    Processing {
        /// Fraction 0.0..=1.0
        overall_progress: f64,
        phase: Option<PhaseProgress>,
    },
    Succeeded,
    Failed {
        message: String,
    },
    Cancelled,
}

impl JobState {
    /// Processing with nothing reported yet.
    pub fn processing_started() -> Self {
        JobState::Processing {
            overall_progress: 0.0,
            phase: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::FetchingMetadata => "fetching_metadata",
            JobState::Submitting => "submitting",
            JobState::Processing { .. } => "processing",
            JobState::Succeeded => "succeeded",
            JobState::Failed { .. } => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed { .. } | JobState::Cancelled
        )
    }

    /// A job is in flight with the engine.
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Submitting | JobState::Processing { .. })
    }

    /// A new submission or metadata fetch may start from here.
    pub fn accepts_new_work(&self) -> bool {
        matches!(self, JobState::Idle) || self.is_terminal()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Processing {
                overall_progress, ..
            } => write!(f, "processing ({:.0}%)", overall_progress * 100.0),
            JobState::Failed { message } => write!(f, "failed: {}", message),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StylePatch;

    #[test]
    fn test_job_state_terminal() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert!(JobState::Failed {
            message: "x".into()
        }
        .is_terminal());
        assert!(!JobState::processing_started().is_terminal());
        assert!(JobState::processing_started().is_active());
        assert!(JobState::Succeeded.accepts_new_work());
        assert!(!JobState::Submitting.accepts_new_work());
    }

    #[test]
    fn test_job_state_serialization() {
        let json = serde_json::to_value(JobState::processing_started()).unwrap();
        assert_eq!(json["state"], "processing");
        assert_eq!(json["overall_progress"], 0.0);
        assert!(json["phase"].is_null());
    }

    #[test]
    fn test_metadata_defaults_fill_trim_end_once() {
        let mut params = JobParams::new("https://youtu.be/abc");
        let meta = VideoMetadata::new("Talk", 1830.0);
        assert!(params.apply_metadata_defaults(&meta));
        assert_eq!(params.trim_end, "1830");
        assert!(!params.apply_metadata_defaults(&VideoMetadata::new("Other", 12.0)));
        assert_eq!(params.trim_end, "1830");
    }

    #[test]
    fn test_job_request_engine_field_names() {
        let request = JobRequest {
            source_url: "https://example.com/v".into(),
            style_preset: None,
            resolution: "1080p".into(),
            output_resolution: "1080x1920".into(),
            min_clip_seconds: 15,
            max_clip_seconds: 60,
            content_genre: "Podcast".into(),
            focus_mode: "auto-face".into(),
            trim_start: Some("0".into()),
            trim_end: None,
            use_stock_footage: true,
            use_multi_speaker_layout: false,
            caption_size: 60,
            caption_position: "center".into(),
            output_bitrate: "5000k".into(),
            compiled_style: StylePatch::default().into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["url"], "https://example.com/v");
        assert!(json["style"].is_null());
        assert_eq!(json["min_sec"], 15);
        assert_eq!(json["focus_region"], "auto-face");
        assert_eq!(json["use_b_roll"], true);
        assert!(json["end_time"].is_null());
        assert!(json["custom_config"].is_object());
    }
}
