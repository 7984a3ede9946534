//! Bounded operator log.

use std::collections::VecDeque;

use clipdesk_models::LogEntry;

pub const COLOR_SUCCESS: &str = "text-green-500";
pub const COLOR_ERROR: &str = "text-red-500";
pub const COLOR_WARNING: &str = "text-yellow-500";
pub const COLOR_INFO: &str = "text-blue-400";

/// Operator-facing log lines, oldest first. Drops the oldest line when full.
#[derive(Debug, Clone)]
pub struct OperatorLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl OperatorLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_oldest_when_full() {
        let mut log = OperatorLog::with_capacity(2);
        log.push(LogEntry::new("one", None));
        log.push(LogEntry::new("two", None));
        log.push(LogEntry::new("three", None));

        let texts: Vec<&str> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["two", "three"]);
        assert_eq!(log.last().unwrap().color, "text-zinc-400");
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let mut log = OperatorLog::with_capacity(0);
        log.push(LogEntry::new("a", None));
        log.push(LogEntry::new("b", None));
        assert_eq!(log.len(), 1);
    }
}
