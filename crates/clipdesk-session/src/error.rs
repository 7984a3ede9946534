//! Session error types.

use clipdesk_engine::{EngineError, ValidationError};
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected locally, nothing was sent
    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("Engine request failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Session has shut down")]
    Closed,
}

impl SessionError {
    pub fn invalid_state(action: &'static str, state: &'static str) -> Self {
        SessionError::InvalidState { action, state }
    }
}
