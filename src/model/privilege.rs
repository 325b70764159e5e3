use serde::{Deserialize, Serialize};

use super::AttributeBag;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Privilege {
    pub name: String,
    pub attributes: AttributeBag,
}

impl Privilege {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeBag::new(),
        }
    }
}

impl PartialEq for Privilege {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Privilege {}
