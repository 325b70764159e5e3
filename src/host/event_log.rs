use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Severity;

const DEFAULT_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// Bounded in-memory log; every entry is mirrored to `tracing` at the matching level.
#[derive(Debug)]
pub struct EventLog {
    entries: Mutex<Vec<LogEntry>>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => {
                tracing::info!(severity = severity.as_str(), "{message}")
            }
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }

        let mut entries = self.entries.lock().expect("event log mutex poisoned");
        if entries.len() == self.capacity {
            entries.remove(0);
        }
        entries.push(LogEntry {
            at: Utc::now(),
            message: message.to_string(),
            severity,
        });
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("event log mutex poisoned")
            .clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.severity == severity)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventLog, Severity};

    #[test]
    fn oldest_entries_are_dropped_at_capacity() {
        let log = EventLog::with_capacity(2);
        log.record("one", Severity::Info);
        log.record("two", Severity::Warning);
        log.record("three", Severity::Error);

        let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(log.with_severity(Severity::Error).len(), 1);
    }
}
