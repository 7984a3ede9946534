//! Shared data models for the ClipDesk job-control client.
//!
//! This crate provides Serde-serializable types for:
//! - Caption style intent and the renderer-ready compiled style
//! - Job parameters, the outbound job request and the job lifecycle state
//! - Produced clips and video metadata
//! - Real-time channel events and their decode step

pub mod clip;
pub mod color;
pub mod connection;
pub mod job;
pub mod log;
pub mod style;
pub mod video;
pub mod ws;

// Re-export common types
pub use clip::{Clip, ClipId};
pub use color::{AssColor, AssColorParseError};
pub use connection::ConnectionState;
pub use job::{JobParams, JobRequest, JobState, PhaseProgress, TerminalStatus};
pub use log::LogEntry;
pub use style::{
    Alignment, BorderStyle, CaptionPosition, CompiledStyle, StyleConfig, StyleOverride, StylePatch,
};
pub use video::VideoMetadata;
pub use ws::{decode_event, DecodeError, EngineEvent, EngineEventType};
