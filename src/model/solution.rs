use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    pub solution_id: String,
    pub friendly_name: String,
    pub unique_name: String,
    pub description: String,
    pub version: String,
    pub is_managed: bool,
    pub root_component_behavior: Option<i64>,
}

impl Solution {
    pub fn new(
        solution_id: impl Into<String>,
        friendly_name: impl Into<String>,
        unique_name: impl Into<String>,
    ) -> Self {
        Self {
            solution_id: solution_id.into(),
            friendly_name: friendly_name.into(),
            unique_name: unique_name.into(),
            ..Default::default()
        }
    }

    pub fn managed_label(&self) -> &'static str {
        if self.is_managed { "Yes" } else { "No" }
    }

    /// Human label for the component's root behavior inside this solution.
    pub fn root_component_label(&self) -> &'static str {
        match self.root_component_behavior {
            Some(0) => "Include Subcomponents",
            Some(1) => "Do Not Include Subcomponents",
            Some(2) => "Include As Shell Only",
            _ => "",
        }
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.solution_id == other.solution_id
    }
}

impl Eq for Solution {}
