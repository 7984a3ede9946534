//! Real-time channel event types.
//!
//! The engine pushes JSON objects tagged by a `type` field. Frames are
//! validated here before anything downstream sees them; anything that does
//! not match a known shape becomes a [`DecodeError`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clip::{Clip, ClipId};
use crate::job::{PhaseProgress, TerminalStatus};

/// Inbound event discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineEventType {
    Log,
    Progress,
    ProgressRich,
    Status,
    ClipReady,
}

impl EngineEventType {
    pub const ALL: &'static [EngineEventType] = &[
        EngineEventType::Log,
        EngineEventType::Progress,
        EngineEventType::ProgressRich,
        EngineEventType::Status,
        EngineEventType::ClipReady,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEventType::Log => "log",
            EngineEventType::Progress => "progress",
            EngineEventType::ProgressRich => "progress_rich",
            EngineEventType::Status => "status",
            EngineEventType::ClipReady => "clip_ready",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }
}

/// Event pushed by the rendering engine over the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Operator log line
    Log {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },

    /// Coarse overall progress (0.0-1.0)
    Progress {
        progress: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Overall progress plus the current phase
    ProgressRich {
        progress: f64,
        phase: String,
        phase_progress: f64,
        #[serde(default)]
        text: String,
    },

    /// Terminal job outcome
    Status {
        state: TerminalStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A clip finished rendering
    ClipReady {
        title: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_time: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_time: Option<f64>,
    },
}

impl EngineEvent {
    /// Create a log event.
    pub fn log(text: impl Into<String>) -> Self {
        EngineEvent::Log {
            text: text.into(),
            color: None,
        }
    }

    /// Create a coarse progress event.
    pub fn progress(progress: f64) -> Self {
        EngineEvent::Progress {
            progress,
            message: None,
        }
    }

    /// Create a status event.
    pub fn status(state: TerminalStatus, message: Option<String>) -> Self {
        EngineEvent::Status { state, message }
    }

    /// Create a clip-ready event with only the required fields.
    pub fn clip_ready(title: impl Into<String>, path: impl Into<String>) -> Self {
        EngineEvent::ClipReady {
            title: title.into(),
            path: path.into(),
            thumbnail: None,
            score: None,
            source_path: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Get the event type.
    pub fn event_type(&self) -> EngineEventType {
        match self {
            EngineEvent::Log { .. } => EngineEventType::Log,
            EngineEvent::Progress { .. } => EngineEventType::Progress,
            EngineEvent::ProgressRich { .. } => EngineEventType::ProgressRich,
            EngineEvent::Status { .. } => EngineEventType::Status,
            EngineEvent::ClipReady { .. } => EngineEventType::ClipReady,
        }
    }

    /// Phase info carried by a rich progress event.
    pub fn phase(&self) -> Option<PhaseProgress> {
        match self {
            EngineEvent::ProgressRich {
                phase,
                phase_progress,
                text,
                ..
            } => Some(PhaseProgress {
                name: phase.clone(),
                text: text.clone(),
                progress: *phase_progress,
            }),
            _ => None,
        }
    }

    /// Build the clip announced by a `clip_ready` event.
    pub fn to_clip(&self) -> Option<Clip> {
        match self {
            EngineEvent::ClipReady {
                title,
                path,
                thumbnail,
                score,
                source_path,
                start_time,
                end_time,
            } => Some(Clip {
                id: ClipId::new(),
                display_name: title.clone(),
                file_path: path.clone(),
                thumbnail_path: thumbnail.clone(),
                viral_score: *score,
                source_clip_path: source_path.clone(),
                source_start: *start_time,
                source_end: *end_time,
            }),
            _ => None,
        }
    }

    /// Encode as a wire frame.
    pub fn to_frame(&self) -> String {
        // Every variant is a plain map of strings and finite numbers.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Why an inbound frame was rejected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Frame is not a tagged JSON object")]
    NotAnObject,

    #[error("Unknown event type: {0}")]
    UnknownType(String),

    #[error("Malformed {event_type} event: {source}")]
    Malformed {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Non-finite number in {0} event")]
    NonFinite(&'static str),
}

impl DecodeError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::InvalidJson(_) => "invalid_json",
            DecodeError::NotAnObject => "not_an_object",
            DecodeError::UnknownType(_) => "unknown_type",
            DecodeError::Malformed { .. } => "malformed",
            DecodeError::NonFinite(_) => "non_finite",
        }
    }
}

/// Decode one text frame into a typed event.
///
/// Validates the `type` tag and the required fields of that variant.
pub fn decode_event(text: &str) -> Result<EngineEvent, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(DecodeError::InvalidJson)?;

    let tag = value
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(|t| t.as_str())
        .ok_or(DecodeError::NotAnObject)?;

    let event_type =
        EngineEventType::from_tag(tag).ok_or_else(|| DecodeError::UnknownType(tag.to_string()))?;

    let event: EngineEvent =
        serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
            event_type: event_type.as_str(),
            source,
        })?;

    let finite = match &event {
        EngineEvent::Progress { progress, .. } => progress.is_finite(),
        EngineEvent::ProgressRich {
            progress,
            phase_progress,
            ..
        } => progress.is_finite() && phase_progress.is_finite(),
        _ => true,
    };
    if !finite {
        return Err(DecodeError::NonFinite(event_type.as_str()));
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_each_event_type() {
        let log = decode_event(r#"{"type":"log","text":"hi","color":"text-red-500"}"#).unwrap();
        assert_eq!(log.event_type(), EngineEventType::Log);

        let progress = decode_event(r#"{"type":"progress","progress":0.25}"#).unwrap();
        assert_eq!(progress, EngineEvent::progress(0.25));

        let rich = decode_event(
            r#"{"type":"progress_rich","progress":0.5,"phase":"Transcribing","phase_progress":0.1,"text":"chunk 1/10"}"#,
        )
        .unwrap();
        let phase = rich.phase().unwrap();
        assert_eq!(phase.name, "Transcribing");
        assert_eq!(phase.text, "chunk 1/10");

        let status = decode_event(r#"{"type":"status","state":"error","message":"boom"}"#).unwrap();
        assert_eq!(
            status,
            EngineEvent::status(TerminalStatus::Error, Some("boom".into()))
        );

        let clip = decode_event(
            r#"{"type":"clip_ready","title":"Hook","path":"/out/1.mp4","score":87,"start_time":3.5,"end_time":40}"#,
        )
        .unwrap()
        .to_clip()
        .unwrap();
        assert_eq!(clip.display_name, "Hook");
        assert_eq!(clip.viral_score, Some(87.0));
        assert_eq!(clip.source_end, Some(40.0));
        assert!(clip.thumbnail_path.is_none());
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        assert!(matches!(decode_event("not json"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(decode_event("[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode_event(r#"{"text":"x"}"#), Err(DecodeError::NotAnObject)));
        assert!(matches!(
            decode_event(r#"{"type":"heartbeat"}"#),
            Err(DecodeError::UnknownType(t)) if t == "heartbeat"
        ));
        assert!(matches!(
            decode_event(r#"{"type":"progress","progress":"half"}"#),
            Err(DecodeError::Malformed { event_type: "progress", .. })
        ));
        assert!(matches!(
            decode_event(r#"{"type":"status","state":"paused"}"#),
            Err(DecodeError::Malformed { .. })
        ));
        assert!(matches!(
            decode_event(r#"{"type":"clip_ready","title":"no path"}"#),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_progress_message_is_optional() {
        let event =
            decode_event(r#"{"type":"progress","progress":0.3,"message":"Scoring"}"#).unwrap();
        assert_eq!(
            event,
            EngineEvent::Progress {
                progress: 0.3,
                message: Some("Scoring".into())
            }
        );
    }

    #[test]
    fn test_frame_roundtrip_keeps_tag() {
        let frame = EngineEvent::clip_ready("Hook", "/out/1.mp4").to_frame();
        assert!(frame.contains("\"type\":\"clip_ready\""));
        assert!(decode_event(&frame).is_ok());
    }

    #[test]
    fn test_event_schema_is_tagged() {
        let schema = schemars::schema_for!(EngineEvent);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("progress_rich"));
        assert!(json.contains("clip_ready"));
    }
}
