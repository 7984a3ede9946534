//! Progress aggregator.
//!
//! Every progress-shaped event overwrites what is displayed. There is no
//! smoothing, clamping or monotonicity: the latest value wins.

use clipdesk_models::{EngineEvent, PhaseProgress, TerminalStatus};
use serde::Serialize;

/// Displayable progress.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ProgressView {
    /// Overall progress, 0..=100 for well-formed input
    pub percent: f64,
    pub phase: Option<PhaseProgress>,
    /// Phase text, or the latest coarse progress message when no phase is active
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressAggregator {
    overall: f64,
    phase: Option<PhaseProgress>,
    message: Option<String>,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event. Returns true when the displayed value changed.
    pub fn apply(&mut self, event: &EngineEvent) -> bool {
        match event {
            EngineEvent::Progress { progress, message } => {
                self.overall = *progress;
                if message.is_some() {
                    self.message = message.clone();
                }
                true
            }
            EngineEvent::ProgressRich { progress, .. } => {
                self.overall = *progress;
                self.phase = event.phase();
                true
            }
            EngineEvent::Status { state, .. } => match state {
                TerminalStatus::Success => {
                    self.overall = 1.0;
                    true
                }
                TerminalStatus::Cancelled => {
                    self.overall = 0.0;
                    self.phase = None;
                    self.message = None;
                    true
                }
                TerminalStatus::Error => false,
            },
            EngineEvent::Log { .. } | EngineEvent::ClipReady { .. } => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overall fraction as last reported.
    pub fn overall(&self) -> f64 {
        self.overall
    }

    pub fn phase(&self) -> Option<&PhaseProgress> {
        self.phase.as_ref()
    }

    pub fn percent(&self) -> f64 {
        self.overall * 100.0
    }

    pub fn view(&self) -> ProgressView {
        let status_text = match &self.phase {
            Some(phase) if !phase.text.is_empty() => Some(phase.text.clone()),
            Some(phase) => Some(phase.name.clone()),
            None => self.message.clone(),
        };
        ProgressView {
            percent: self.percent(),
            phase: self.phase.clone(),
            status_text,
        }
    }
}
