//! Engine request/response bodies.

use clipdesk_models::{StyleOverride, VideoMetadata};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const STATUS_ERROR: &str = "error";

/// Body for `POST /metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataRequest<'a> {
    pub url: &'a str,
}

/// Reply to `POST /metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "durationSeconds")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MetadataResponse {
    pub fn into_metadata(self) -> EngineResult<VideoMetadata> {
        if self.status == STATUS_ERROR {
            return Err(EngineError::backend(
                self.message
                    .unwrap_or_else(|| "Metadata fetch failed".to_string()),
            ));
        }

        let duration = self
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| EngineError::invalid_response("metadata reply without a duration"))?;

        Ok(VideoMetadata::new(self.title.unwrap_or_default(), duration))
    }
}

/// Generic `{status, message?}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    /// `Err(Backend)` for an error status, otherwise the status string.
    pub fn into_result(self) -> EngineResult<String> {
        if self.status == STATUS_ERROR {
            Err(EngineError::backend(
                self.message.unwrap_or_else(|| "Engine reported an error".to_string()),
            ))
        } else {
            Ok(self.status)
        }
    }
}

/// Body for `POST /rerender_clip`.
#[derive(Debug, Clone, Serialize)]
pub struct RerenderRequest<'a> {
    pub path: &'a str,
    pub custom_config: &'a StyleOverride,
}

/// Reply to `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthResponse {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_reply() {
        let reply: MetadataResponse =
            serde_json::from_str(r#"{"status":"success","duration":1830.5,"title":"Talk"}"#)
                .unwrap();
        let meta = reply.into_metadata().unwrap();
        assert_eq!(meta.title, "Talk");
        assert_eq!(meta.duration_seconds, 1830.5);
    }

    #[test]
    fn test_metadata_error_reply() {
        let reply: MetadataResponse =
            serde_json::from_str(r#"{"status":"error","message":"Video unavailable"}"#).unwrap();
        let err = reply.into_metadata().unwrap_err();
        assert!(matches!(err, EngineError::Backend(m) if m == "Video unavailable"));
    }

    #[test]
    fn test_metadata_without_duration_is_invalid() {
        let reply: MetadataResponse =
            serde_json::from_str(r#"{"status":"success","title":"x"}"#).unwrap();
        assert!(matches!(
            reply.into_metadata(),
            Err(EngineError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_reply() {
        let ok: StatusResponse = serde_json::from_str(r#"{"status":"started"}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), "started");

        let err: StatusResponse =
            serde_json::from_str(r#"{"status":"error","message":"Already processing"}"#).unwrap();
        assert_eq!(err.into_result().unwrap_err().to_string(), "Already processing");
    }
}
