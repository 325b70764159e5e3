use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::Utc;

use super::{EventLog, HostBridge, HostError, LogEntry, Notification, Severity};

/// Headless host: files land in `output_dir`, toasts and log lines are kept in memory.
#[derive(Debug)]
pub struct LocalHost {
    output_dir: PathBuf,
    events: EventLog,
    notifications: Mutex<Vec<Notification>>,
}

impl LocalHost {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            events: EventLog::default(),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn events(&self) -> Vec<LogEntry> {
        self.events.entries()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl HostBridge for LocalHost {
    fn notify(&self, title: &str, body: &str, severity: Severity) {
        tracing::info!(title, severity = severity.as_str(), "notification: {body}");
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .push(Notification {
                at: Utc::now(),
                title: title.to_string(),
                body: body.to_string(),
                severity,
            });
    }

    fn log(&self, message: &str, severity: Severity) {
        self.events.record(message, severity);
    }

    async fn save_file(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, HostError> {
        let file_name = sanitize_file_name(file_name)?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| HostError::Write {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| HostError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!("saved {}", path.display());
        Ok(path)
    }
}

/// Display names come from remote metadata; keep them from escaping the output directory.
fn sanitize_file_name(raw: &str) -> Result<String, HostError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other if other.is_control() => '_',
            other => other,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        return Err(HostError::InvalidFileName(raw.to_string()));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::{HostBridge, LocalHost, Severity, sanitize_file_name};

    #[test]
    fn file_names_are_flattened_into_output_dir() {
        assert_eq!(
            sanitize_file_name("../Account: Main/Info.csv").expect("valid name"),
            ".._Account_ Main_Info.csv"
        );
        assert!(sanitize_file_name("  ").is_err());
        assert!(sanitize_file_name("..").is_err());
    }

    #[tokio::test]
    async fn save_file_writes_into_output_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let host = LocalHost::new(dir.path().join("exports"));

        let path = host
            .save_file("Account_metadata.csv", b"a,b")
            .await
            .expect("file should be written");

        assert_eq!(path, dir.path().join("exports").join("Account_metadata.csv"));
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "a,b");
    }

    #[test]
    fn notifications_and_log_entries_are_kept() {
        let host = LocalHost::new("unused");
        host.notify("No Connection", "Please connect", Severity::Warning);
        host.log("Loaded 3 tables", Severity::Info);

        assert_eq!(host.notifications().len(), 1);
        assert_eq!(host.notifications()[0].title, "No Connection");
        assert_eq!(host.events()[0].message, "Loaded 3 tables");
    }
}
