use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No active connection was supplied to the gateway.
    #[error("No connection available")]
    NoConnection,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("table {table} has no usable metadata id: {id:?}")]
    InvalidId { table: String, id: String },

    #[error("{0}")]
    Remote(String),
}

impl GatewayError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn is_no_connection(&self) -> bool {
        matches!(self, GatewayError::NoConnection)
    }
}
