use crate::{
    export::ExportError,
    gateway::GatewayError,
    host::{HostError, SettingsError},
    model::Aspect,
};

/// Errors surfaced by the session-level entry points.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Error loading {aspect}: {message}")]
    Load { aspect: Aspect, message: String },
    #[error("No connection available")]
    NoConnection,
    #[error("table {0} not found")]
    TableNotFound(String),
}

impl BrowserError {
    pub fn load(aspect: Aspect, message: impl Into<String>) -> Self {
        Self::Load {
            aspect,
            message: message.into(),
        }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound(name.into())
    }

    pub fn is_no_connection(&self) -> bool {
        match self {
            Self::NoConnection => true,
            Self::Gateway(err) => err.is_no_connection(),
            _ => false,
        }
    }
}
