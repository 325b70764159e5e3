use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.logging.rust_log.trim().is_empty() {
        errors.push("logging.rust_log must not be empty".to_string());
    }

    if let Some(connection) = cfg.connection.as_ref() {
        let url = connection.url.trim();
        if url.is_empty() {
            errors.push("connection.url must not be empty".to_string());
        } else if !(url.starts_with("https://") || url.starts_with("http://")) {
            errors.push(format!(
                "connection.url must be an http(s) URL, got {url:?}"
            ));
        }

        if connection.name.trim().is_empty() {
            errors.push("connection.name must not be empty".to_string());
        }

        if connection.api_version.trim().is_empty() {
            errors.push("connection.api_version must not be empty".to_string());
        }

        if connection.timeout_secs == 0 {
            errors.push("connection.timeout_secs must be > 0".to_string());
        }
    }

    if cfg.settings.path.trim().is_empty() {
        errors.push("settings.path must not be empty".to_string());
    }

    if cfg.export.output_dir.trim().is_empty() {
        errors.push("export.output_dir must not be empty".to_string());
    }

    if cfg
        .browse
        .solution
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        errors.push("browse.solution must not be blank when set".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
