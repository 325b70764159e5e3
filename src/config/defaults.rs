pub const DEFAULT_RUST_LOG: &str = "info,reqwest=warn";
pub const DEFAULT_LOG_WITH_TARGET: bool = false;
pub const DEFAULT_CONNECTION_NAME: &str = "default";
pub const DEFAULT_API_VERSION: &str = "9.2";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_SETTINGS_PATH: &str = "metadata_browser_settings.json";
pub const DEFAULT_OUTPUT_DIR: &str = "exports";
