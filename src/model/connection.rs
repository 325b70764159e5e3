use serde::{Deserialize, Serialize};

/// An environment the host has connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub name: String,
    pub environment_url: String,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    pub is_active: bool,
}

impl Connection {
    pub fn new(name: impl Into<String>, environment_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment_url: environment_url.into(),
            access_token: String::new(),
            is_active: true,
        }
    }

    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = access_token.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Created,
    Updated,
    Deleted,
}

impl std::str::FromStr for ConnectionEvent {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "connection:created" => Ok(ConnectionEvent::Created),
            "connection:updated" => Ok(ConnectionEvent::Updated),
            "connection:deleted" => Ok(ConnectionEvent::Deleted),
            other => Err(format!("not a connection event: {other}")),
        }
    }
}
