use std::{collections::HashMap, sync::Mutex};

use serde::Serialize;

use crate::model::Aspect;

/// Identifies one lazily loaded collection within one view-model generation.
/// The session-wide table list uses an empty table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub epoch: u64,
    pub table: String,
    pub aspect: Aspect,
}

impl LoadKey {
    pub fn new(epoch: u64, table: impl Into<String>, aspect: Aspect) -> Self {
        Self {
            epoch,
            table: table.into(),
            aspect,
        }
    }

    pub fn table_list(epoch: u64) -> Self {
        Self::new(epoch, String::new(), Aspect::Tables)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded {
        count: usize,
    },
    Failed {
        message: String,
    },
}

/// Why `begin` refused to start a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    InFlight,
    AlreadyLoaded,
}

#[derive(Debug, Default)]
pub struct LoadCache {
    states: Mutex<HashMap<LoadKey, LoadState>>,
}

impl LoadCache {
    pub fn state(&self, key: &LoadKey) -> LoadState {
        self.states
            .lock()
            .expect("load cache mutex poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Marks `key` as loading. A failed or unloaded key always starts; a loaded
    /// one only when `force` is set; a loading one never does.
    pub fn begin(&self, key: &LoadKey, force: bool) -> Result<(), Busy> {
        let mut states = self.states.lock().expect("load cache mutex poisoned");
        states.retain(|existing, _| existing.epoch >= key.epoch);

        match states.get(key) {
            Some(LoadState::Loading) => return Err(Busy::InFlight),
            Some(LoadState::Loaded { .. }) if !force => return Err(Busy::AlreadyLoaded),
            _ => {}
        }
        states.insert(key.clone(), LoadState::Loading);
        Ok(())
    }

    pub fn finish(&self, key: &LoadKey, state: LoadState) {
        self.states
            .lock()
            .expect("load cache mutex poisoned")
            .insert(key.clone(), state);
    }

    pub fn clear(&self, key: &LoadKey) {
        self.states
            .lock()
            .expect("load cache mutex poisoned")
            .remove(key);
    }
}
