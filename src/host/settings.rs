use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not a JSON object of strings: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Host key/value settings. Values are opaque strings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .try_lock()
            .expect("fresh settings store is unshared")
            .insert(key.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as one JSON object file. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SettingsError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettings {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());

        let encoded = serde_json::to_string_pretty(&values).map_err(|source| {
            SettingsError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SettingsError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|source| SettingsError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileSettings, MemorySettings, SettingsStore};

    #[tokio::test]
    async fn file_settings_round_trip_and_keep_other_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileSettings::new(dir.path().join("nested").join("settings.json"));

        assert_eq!(store.get("defaultTableColumns").await.expect("read"), None);

        store
            .set("defaultTableColumns", "IsCustomizable,SchemaName")
            .await
            .expect("write first key");
        store
            .set("defaultExcelExportOptions", "{}")
            .await
            .expect("write second key");

        assert_eq!(
            store.get("defaultTableColumns").await.expect("read"),
            Some("IsCustomizable,SchemaName".to_string())
        );
        assert_eq!(
            store.get("defaultExcelExportOptions").await.expect("read"),
            Some("{}".to_string())
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1,2]").expect("seed file");

        let store = JsonFileSettings::new(&path);
        assert!(store.get("anything").await.is_err());
    }

    #[tokio::test]
    async fn memory_settings_seed_values() {
        let store = MemorySettings::new().with_value("k", "v");
        assert_eq!(store.get("k").await.expect("read"), Some("v".to_string()));
    }
}
