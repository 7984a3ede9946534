//! Engine client error types.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Transport failure before a response arrived
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Engine returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// `{"status":"error","message":...}` payload
    #[error("{0}")]
    Backend(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn backend(message: impl Into<String>) -> Self {
        EngineError::Backend(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        EngineError::InvalidResponse(message.into())
    }

    /// Worth retrying for idempotent calls.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EngineError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The engine answered and reported an error itself.
    pub fn is_backend(&self) -> bool {
        matches!(self, EngineError::Backend(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Network(_) => "network",
            EngineError::Http { .. } => "http",
            EngineError::Backend(_) => "backend",
            EngineError::InvalidResponse(_) => "invalid_response",
            EngineError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(EngineError::Http {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!EngineError::Http {
            status: 422,
            body: String::new()
        }
        .is_retryable());
        assert!(!EngineError::backend("Already processing").is_retryable());
    }

    #[test]
    fn test_backend_message_is_shown_verbatim() {
        let err = EngineError::backend("Already processing");
        assert!(err.is_backend());
        assert_eq!(err.to_string(), "Already processing");
        assert_eq!(err.kind(), "backend");
    }
}
