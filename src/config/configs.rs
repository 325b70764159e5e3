use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{gateway::ClientConfig, model::Connection};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub connection: Option<ConnectionConfig>,
    pub settings: SettingsConfig,
    pub export: ExportConfig,
    pub browse: BrowseConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }

    pub fn client_config(&self) -> ClientConfig {
        self.connection
            .as_ref()
            .map(ConnectionConfig::client_config)
            .unwrap_or_default()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
            with_target: defaults::DEFAULT_LOG_WITH_TARGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(default = "default_connection_name")]
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing)]
    pub access_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConnectionConfig {
    pub fn to_connection(&self) -> Connection {
        Connection::new(self.name.as_str(), self.url.as_str())
            .with_token(self.access_token.as_str())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_version: self.api_version.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: defaults::DEFAULT_SETTINGS_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

/// What the headless runner does after connecting.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct BrowseConfig {
    pub solution: Option<String>,
    pub managed_solutions: bool,
    /// Comma-separated logical names to open.
    pub tables: String,
    pub export_excel: bool,
}

impl BrowseConfig {
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_connection_name() -> String {
    defaults::DEFAULT_CONNECTION_NAME.to_string()
}

fn default_api_version() -> String {
    defaults::DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    defaults::DEFAULT_TIMEOUT_SECS as u64
}
