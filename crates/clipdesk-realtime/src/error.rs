//! Channel error types.

use thiserror::Error;

pub type ChannelResult<T> = Result<T, ChannelError>;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// Connect, read or write failure on the socket
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Channel is not open")]
    NotOpen,

    #[error("Channel task has stopped")]
    Closed,
}

impl ChannelError {
    /// Transport failures are recovered by the reconnect loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::Transport(_) | ChannelError::NotOpen)
    }
}
