pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, BrowseConfig, ConnectionConfig, ExportConfig, LoggingConfig, SettingsConfig,
};
pub use envconfig::EnvConfig;
