//! Clips produced by the rendering engine.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally assigned clip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Generate a new random clip ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished clip announced by a `clip_ready` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    pub id: ClipId,
    pub display_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Engine's virality estimate (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viral_score: Option<f64>,
    /// Uncaptioned source cut the clip was rendered from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_clip_path: Option<String>,
    /// Start offset in the source video (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_start: Option<f64>,
    /// End offset in the source video (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_end: Option<f64>,
}

impl Clip {
    pub fn new(display_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            id: ClipId::new(),
            display_name: display_name.into(),
            file_path: file_path.into(),
            thumbnail_path: None,
            viral_score: None,
            source_clip_path: None,
            source_start: None,
            source_end: None,
        }
    }

    /// Clip length in seconds when the source range is known.
    pub fn duration(&self) -> Option<f64> {
        match (self.source_start, self.source_end) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}
