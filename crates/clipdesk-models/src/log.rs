//! Operator log entries.

use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default color class for engine log lines without one.
pub const DEFAULT_LOG_COLOR: &str = "text-zinc-400";

/// One line of the operator log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogEntry {
    pub text: String,
    /// UI color class (e.g. `text-red-500`)
    pub color: String,
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    pub fn new(text: impl Into<String>, color: Option<String>) -> Self {
        Self {
            text: text.into(),
            color: color.unwrap_or_else(|| DEFAULT_LOG_COLOR.to_string()),
            timestamp: Local::now(),
        }
    }

    /// Advisory line produced locally (connectivity changes and the like).
    pub fn advisory(text: impl Into<String>, color: &str) -> Self {
        Self::new(text, Some(color.to_string()))
    }

    /// `HH:MM:SS` local time for display.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
