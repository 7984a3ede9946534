//! Session configuration.

/// Tunables for one job session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Operator log lines kept before the oldest are dropped
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { log_capacity: 1000 }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            log_capacity: std::env::var("SESSION_LOG_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1000),
        }
    }
}
