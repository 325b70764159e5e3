use serde::{Deserialize, Serialize};

use super::AttributeBag;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub logical_name: String,
    pub display_name: String,
    pub data_type: String,
    pub attributes: AttributeBag,
}

impl Column {
    pub fn new(logical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.logical_name.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.logical_name == other.logical_name
    }
}

impl Eq for Column {}
