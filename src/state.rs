use std::sync::Arc;

use crate::{
    config::AppConfig,
    gateway::WebApiGatewayFactory,
    host::{HostBridge, JsonFileSettings, LocalHost},
    services::Session,
};

pub struct AppState {
    pub config: AppConfig,
    pub host: Arc<LocalHost>,
    pub session: Session,
}

impl AppState {
    pub fn new(config: AppConfig, host: Arc<LocalHost>, session: Session) -> Arc<Self> {
        Arc::new(Self {
            config,
            host,
            session,
        })
    }

    /// Headless wiring: files go to the export directory, settings to a JSON file,
    /// metadata comes from the configured Web API connection.
    pub fn from_config(config: AppConfig) -> Arc<Self> {
        let host = Arc::new(LocalHost::new(config.export.output_dir.as_str()));
        let bridge: Arc<dyn HostBridge> = host.clone();
        let settings = Arc::new(JsonFileSettings::new(config.settings.path.as_str()));
        let factory = Arc::new(WebApiGatewayFactory::new(
            config.client_config(),
            Arc::clone(&bridge),
        ));
        let connection = config
            .connection
            .as_ref()
            .map(|connection| connection.to_connection());

        let session = Session::new(bridge, settings, factory, connection);
        Self::new(config, host, session)
    }
}
