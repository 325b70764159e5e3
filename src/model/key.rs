use serde::{Deserialize, Serialize};

use super::AttributeBag;

/// Alternate key defined on a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Key {
    pub name: String,
    pub attributes: AttributeBag,
}

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeBag::new(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Key {}
