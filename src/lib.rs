pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod gateway;
pub mod host;
pub mod logging;
pub mod model;
pub mod services;
pub mod state;
pub mod test_helpers;
pub mod view_model;
