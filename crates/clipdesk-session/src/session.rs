//! Job session state: the reduced job state plus everything shown beside it.

use clipdesk_models::{
    Clip, ConnectionState, EngineEvent, JobState, LogEntry, TerminalStatus, VideoMetadata,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{ProgressAggregator, ProgressView};
use crate::config::SessionConfig;
use crate::log::{OperatorLog, COLOR_ERROR, COLOR_SUCCESS, COLOR_WARNING};
use crate::metrics;
use crate::reducer::{reduce, Ack, SessionEvent};

/// Point-in-time copy of the session for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub job: JobState,
    pub progress: ProgressView,
    pub clips: Vec<Clip>,
    pub log: Vec<LogEntry>,
    pub connection: ConnectionState,
    pub metadata: Option<VideoMetadata>,
}

/// Mutable session state. Only [`Session::apply`] changes it.
#[derive(Debug, Clone)]
pub struct Session {
    job: JobState,
    progress: ProgressAggregator,
    clips: Vec<Clip>,
    log: OperatorLog,
    connection: ConnectionState,
    metadata: Option<VideoMetadata>,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            job: JobState::Idle,
            progress: ProgressAggregator::new(),
            clips: Vec::new(),
            log: OperatorLog::with_capacity(config.log_capacity),
            connection: ConnectionState::Disconnected,
            metadata: None,
        }
    }

    pub fn job(&self) -> &JobState {
        &self.job
    }

    pub fn progress(&self) -> &ProgressAggregator {
        &self.progress
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn log(&self) -> &OperatorLog {
        &self.log
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }

    /// Keep fetched metadata for display.
    pub fn set_metadata(&mut self, metadata: Option<VideoMetadata>) {
        self.metadata = metadata;
    }

    /// Append a locally produced line to the operator log.
    pub fn note(&mut self, text: impl Into<String>, color: &str) {
        self.log.push(LogEntry::advisory(text, color));
    }

    /// Apply one event. Returns true when the job state changed.
    pub fn apply(&mut self, event: &SessionEvent) -> bool {
        let previous = self.job.clone();
        let next = reduce(&previous, event);

        match event {
            SessionEvent::SubmitRequested if next == JobState::Submitting => {
                self.clips.clear();
                self.log.clear();
                self.progress.reset();
                metrics::record_job_submitted();
            }
            SessionEvent::SubmitAcknowledged(Ack::Rejected(message))
            | SessionEvent::SubmitAcknowledged(Ack::RequestFailed(message))
                if previous.is_active() =>
            {
                self.note(format!("Job could not start: {}", message), COLOR_ERROR);
            }
            SessionEvent::Engine(engine_event) => self.apply_engine_event(&previous, engine_event),
            SessionEvent::ConnectionChanged(state) => self.apply_connection(*state),
            SessionEvent::Reset if next == JobState::Idle => {
                self.progress.reset();
                self.metadata = None;
            }
            _ => {}
        }

        let changed = next != previous;
        if changed {
            // Progress-only updates within Processing are too chatty for info.
            if previous.name() != next.name() {
                info!(from = previous.name(), to = next.name(), "Job state changed");
            }
            if next.is_terminal() && previous.name() != next.name() {
                metrics::record_job_outcome(next.name());
            }
        }
        self.job = next;
        changed
    }

    fn apply_engine_event(&mut self, previous: &JobState, event: &EngineEvent) {
        match event {
            EngineEvent::Log { text, color } => {
                info!(target: "clipdesk::engine", "{}", text);
                self.log.push(LogEntry::new(text.clone(), color.clone()));
            }
            EngineEvent::ClipReady { title, path, .. } => {
                if let Some(clip) = event.to_clip() {
                    info!(title = %title, path = %path, "Clip ready");
                    metrics::record_clip_received();
                    self.clips.push(clip);
                }
            }
            EngineEvent::Progress { .. } | EngineEvent::ProgressRich { .. } => {
                if previous.is_active() {
                    self.progress.apply(event);
                }
            }
            EngineEvent::Status { state, message } => {
                if !previous.is_active() && !previous.is_terminal() {
                    warn!(status = %state, "Ignoring status event with no job in flight");
                    return;
                }
                self.progress.apply(event);
                match state {
                    TerminalStatus::Success => self.note("Processing complete", COLOR_SUCCESS),
                    TerminalStatus::Cancelled => self.note("Job cancelled", COLOR_WARNING),
                    TerminalStatus::Error => self.note(
                        format!(
                            "Processing failed: {}",
                            message.as_deref().unwrap_or("unknown error")
                        ),
                        COLOR_ERROR,
                    ),
                }
            }
        }
    }

    fn apply_connection(&mut self, state: ConnectionState) {
        let previous = std::mem::replace(&mut self.connection, state);
        match state {
            ConnectionState::Open => self.note("Connected to engine", COLOR_SUCCESS),
            ConnectionState::ReconnectPending { delay_ms } if previous.is_open() => self.note(
                format!("Disconnected. Retrying in {}s...", delay_ms as f64 / 1000.0),
                COLOR_ERROR,
            ),
            _ => {}
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            job: self.job.clone(),
            progress: self.progress.view(),
            clips: self.clips.clone(),
            log: self.log.to_vec(),
            connection: self.connection,
            metadata: self.metadata.clone(),
        }
    }
}
