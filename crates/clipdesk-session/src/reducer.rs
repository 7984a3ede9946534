//! Job lifecycle reducer.
//!
//! `(JobState, SessionEvent) -> JobState`, with no I/O. Request
//! acknowledgements and streamed events may arrive in either order; every
//! pairing of state and event has a defined outcome here.

use clipdesk_models::{ConnectionState, EngineEvent, JobState, TerminalStatus};

/// Result of the submit call.
#[derive(Debug, Clone, PartialEq)]
pub enum Ack {
    /// Engine accepted the job
    Accepted,
    /// Engine answered with `status: "error"`
    Rejected(String),
    /// The call itself failed (network, HTTP status, unreadable body)
    RequestFailed(String),
}

/// Everything that can move the job state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    FetchMetadataRequested,
    /// The metadata call finished, successfully or not
    MetadataResolved,
    SubmitRequested,
    SubmitAcknowledged(Ack),
    Engine(EngineEvent),
    ConnectionChanged(ConnectionState),
    CancelRequested,
    Reset,
}

const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

/// Compute the next job state.
pub fn reduce(state: &JobState, event: &SessionEvent) -> JobState {
    use JobState::*;

    match (state, event) {
        (s, SessionEvent::FetchMetadataRequested) if s.accepts_new_work() => FetchingMetadata,
        (FetchingMetadata, SessionEvent::MetadataResolved) => Idle,

        (s, SessionEvent::SubmitRequested) if s.accepts_new_work() => Submitting,

        (Submitting, SessionEvent::SubmitAcknowledged(Ack::Accepted)) => {
            JobState::processing_started()
        }
        (
            Submitting | Processing { .. },
            SessionEvent::SubmitAcknowledged(Ack::Rejected(message) | Ack::RequestFailed(message)),
        ) => Failed {
            message: message.clone(),
        },

        (Submitting | Processing { .. }, SessionEvent::Engine(EngineEvent::Progress { progress, .. })) => {
            let phase = match state {
                Processing { phase, .. } => phase.clone(),
                _ => None,
            };
            Processing {
                overall_progress: *progress,
                phase,
            }
        }
        (Submitting | Processing { .. }, SessionEvent::Engine(event @ EngineEvent::ProgressRich { progress, .. })) => {
            Processing {
                overall_progress: *progress,
                phase: event.phase(),
            }
        }

        // Last terminal event wins, including over an earlier terminal state.
        (
            Submitting | Processing { .. } | Succeeded | Failed { .. } | Cancelled,
            SessionEvent::Engine(EngineEvent::Status { state: status, message }),
        ) => terminal(*status, message.as_deref()),

        (s, SessionEvent::Reset) if !s.is_active() => Idle,

        (s, _) => s.clone(),
    }
}

fn terminal(status: TerminalStatus, message: Option<&str>) -> JobState {
    match status {
        TerminalStatus::Success => JobState::Succeeded,
        TerminalStatus::Error => JobState::Failed {
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string(),
        },
        TerminalStatus::Cancelled => JobState::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdesk_models::PhaseProgress;

    fn processing(progress: f64) -> JobState {
        JobState::Processing {
            overall_progress: progress,
            phase: None,
        }
    }

    fn status(state: TerminalStatus) -> SessionEvent {
        SessionEvent::Engine(EngineEvent::status(state, None))
    }

    #[test]
    fn test_metadata_subflow() {
        let s = reduce(&JobState::Idle, &SessionEvent::FetchMetadataRequested);
        assert_eq!(s, JobState::FetchingMetadata);
        assert_eq!(reduce(&s, &SessionEvent::MetadataResolved), JobState::Idle);

        // Not while a job runs.
        let busy = processing(0.2);
        assert_eq!(reduce(&busy, &SessionEvent::FetchMetadataRequested), busy);
    }

    #[test]
    fn test_submit_lifecycle() {
        let s = reduce(&JobState::Idle, &SessionEvent::SubmitRequested);
        assert_eq!(s, JobState::Submitting);

        let s = reduce(&s, &SessionEvent::SubmitAcknowledged(Ack::Accepted));
        assert_eq!(s, JobState::processing_started());

        let s = reduce(&s, &SessionEvent::Engine(EngineEvent::progress(0.5)));
        assert_eq!(s, processing(0.5));

        let s = reduce(&s, &status(TerminalStatus::Success));
        assert_eq!(s, JobState::Succeeded);

        // A finished job can be followed by a new one.
        assert_eq!(
            reduce(&s, &SessionEvent::SubmitRequested),
            JobState::Submitting
        );
    }

    #[test]
    fn test_submit_failures() {
        let rejected = reduce(
            &JobState::Submitting,
            &SessionEvent::SubmitAcknowledged(Ack::Rejected("Already processing".into())),
        );
        assert_eq!(
            rejected,
            JobState::Failed {
                message: "Already processing".into()
            }
        );

        let failed = reduce(
            &JobState::Submitting,
            &SessionEvent::SubmitAcknowledged(Ack::RequestFailed("connection refused".into())),
        );
        assert!(matches!(failed, JobState::Failed { .. }));
    }

    #[test]
    fn test_events_before_ack() {
        // Progress may beat the submit acknowledgement.
        let s = reduce(
            &JobState::Submitting,
            &SessionEvent::Engine(EngineEvent::progress(0.1)),
        );
        assert_eq!(s, processing(0.1));

        // The late ack does not reset progress.
        assert_eq!(
            reduce(&s, &SessionEvent::SubmitAcknowledged(Ack::Accepted)),
            processing(0.1)
        );

        // A terminal status may also arrive first; the ack is then ignored.
        let done = reduce(&JobState::Submitting, &status(TerminalStatus::Success));
        assert_eq!(done, JobState::Succeeded);
        assert_eq!(
            reduce(&done, &SessionEvent::SubmitAcknowledged(Ack::Accepted)),
            JobState::Succeeded
        );
    }

    #[test]
    fn test_rich_progress_sets_phase_and_coarse_keeps_it() {
        let s = reduce(
            &processing(0.0),
            &SessionEvent::Engine(EngineEvent::ProgressRich {
                progress: 0.3,
                phase: "Transcribing".into(),
                phase_progress: 0.5,
                text: "chunk 5/10".into(),
            }),
        );
        let expected_phase = Some(PhaseProgress {
            name: "Transcribing".into(),
            text: "chunk 5/10".into(),
            progress: 0.5,
        });
        assert_eq!(
            s,
            JobState::Processing {
                overall_progress: 0.3,
                phase: expected_phase.clone()
            }
        );

        let s = reduce(&s, &SessionEvent::Engine(EngineEvent::progress(0.25)));
        assert_eq!(
            s,
            JobState::Processing {
                overall_progress: 0.25,
                phase: expected_phase
            }
        );
    }

    #[test]
    fn test_streamed_terminal_statuses() {
        let p = processing(0.7);
        assert_eq!(
            reduce(&p, &status(TerminalStatus::Cancelled)),
            JobState::Cancelled
        );
        assert_eq!(
            reduce(
                &p,
                &SessionEvent::Engine(EngineEvent::status(
                    TerminalStatus::Error,
                    Some("ffmpeg exited".into())
                ))
            ),
            JobState::Failed {
                message: "ffmpeg exited".into()
            }
        );
        assert_eq!(
            reduce(&p, &status(TerminalStatus::Error)),
            JobState::Failed {
                message: DEFAULT_FAILURE_MESSAGE.into()
            }
        );
    }

    #[test]
    fn test_last_terminal_event_wins() {
        let s = reduce(&processing(0.9), &status(TerminalStatus::Success));
        let s = reduce(&s, &status(TerminalStatus::Cancelled));
        assert_eq!(s, JobState::Cancelled);
    }

    #[test]
    fn test_cancel_intent_does_not_transition() {
        let p = processing(0.4);
        assert_eq!(reduce(&p, &SessionEvent::CancelRequested), p);
    }

    #[test]
    fn test_connection_changes_never_touch_job() {
        let p = processing(0.4);
        for state in [
            ConnectionState::ReconnectPending { delay_ms: 3000 },
            ConnectionState::Disconnected,
            ConnectionState::Open,
        ] {
            assert_eq!(reduce(&p, &SessionEvent::ConnectionChanged(state)), p);
        }
    }

    #[test]
    fn test_stale_events_while_idle_are_ignored() {
        assert_eq!(
            reduce(&JobState::Idle, &status(TerminalStatus::Success)),
            JobState::Idle
        );
        assert_eq!(
            reduce(
                &JobState::Idle,
                &SessionEvent::Engine(EngineEvent::progress(0.3))
            ),
            JobState::Idle
        );
        assert_eq!(
            reduce(
                &JobState::FetchingMetadata,
                &status(TerminalStatus::Cancelled)
            ),
            JobState::FetchingMetadata
        );
    }

    #[test]
    fn test_reset() {
        assert_eq!(
            reduce(&JobState::Cancelled, &SessionEvent::Reset),
            JobState::Idle
        );
        let p = processing(0.1);
        assert_eq!(reduce(&p, &SessionEvent::Reset), p);
    }
}
