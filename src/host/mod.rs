//! Host bridge: the desktop shell's notification toasts, event log, file sink and
//! settings storage, expressed as traits so the core can run headless.

pub mod event_log;
pub mod local;
pub mod settings;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use event_log::{EventLog, LogEntry, Notification};
pub use local::LocalHost;
pub use settings::{JsonFileSettings, MemorySettings, SettingsError, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Toast shown to the user. Fire and forget.
    fn notify(&self, title: &str, body: &str, severity: Severity);

    /// Entry in the in-app event log. Fire and forget.
    fn log(&self, message: &str, severity: Severity);

    async fn save_file(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, HostError>;
}
