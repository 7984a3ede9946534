//! Job request builder.
//!
//! Validation happens here and nowhere upstream: a request that fails to
//! build never reaches the engine.

use clipdesk_models::{JobParams, JobRequest, StyleOverride};
use clipdesk_style::{compile, PresetCatalog};
use thiserror::Error;

/// Used when a label is neither in the table nor a literal `WxH`.
pub const DEFAULT_OUTPUT_RESOLUTION: &str = "1080x1920";

const RESOLUTIONS: &[(&str, &str)] = &[
    ("1080p", "1080x1920"),
    ("720p", "720x1280"),
    ("1440p", "1440x2560"),
    ("4k", "2160x3840"),
];

/// A job request precondition was violated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Source URL is required")]
    EmptySourceUrl,

    #[error("Trim start ({start}s) must be before trim end ({end}s)")]
    TrimOrder { start: f64, end: f64 },

    #[error("Minimum clip length ({min}s) exceeds maximum ({max}s)")]
    ClipBounds { min: u32, max: u32 },
}

/// Map a friendly resolution label to a literal `WxH`.
pub fn resolve_resolution(label: &str) -> String {
    let label = label.trim();
    if let Some((_, literal)) = RESOLUTIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
    {
        return literal.to_string();
    }
    if label.contains('x') {
        return label.to_string();
    }
    DEFAULT_OUTPUT_RESOLUTION.to_string()
}

/// Build the engine payload from edited parameters.
pub fn build_request(
    params: &JobParams,
    catalog: &PresetCatalog,
) -> Result<JobRequest, ValidationError> {
    let source_url = params.source_url.trim();
    if source_url.is_empty() {
        return Err(ValidationError::EmptySourceUrl);
    }

    let trim_start = non_empty(&params.trim_start);
    let trim_end = non_empty(&params.trim_end);
    if let (Some(start), Some(end)) = (
        trim_start.as_deref().and_then(parse_seconds),
        trim_end.as_deref().and_then(parse_seconds),
    ) {
        if start >= end {
            return Err(ValidationError::TrimOrder { start, end });
        }
    }

    if params.min_clip_seconds > params.max_clip_seconds {
        return Err(ValidationError::ClipBounds {
            min: params.min_clip_seconds,
            max: params.max_clip_seconds,
        });
    }

    let style = &params.style;
    let style_preset = (!style.custom_mode_enabled).then(|| style.preset_name.clone());

    Ok(JobRequest {
        source_url: source_url.to_string(),
        style_preset,
        resolution: params.output_resolution.clone(),
        output_resolution: resolve_resolution(&params.output_resolution),
        min_clip_seconds: params.min_clip_seconds,
        max_clip_seconds: params.max_clip_seconds,
        content_genre: params.content_genre.clone(),
        focus_mode: params.focus_mode.clone(),
        trim_start,
        trim_end,
        use_stock_footage: params.use_stock_footage,
        use_multi_speaker_layout: params.use_multi_speaker_layout,
        caption_size: style.caption_size,
        caption_position: style.caption_position.as_str().to_string(),
        output_bitrate: params.output_bitrate.clone(),
        compiled_style: StyleOverride::Full(compile(catalog, style)),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_seconds(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
