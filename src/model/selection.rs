use serde::{Deserialize, Serialize};

use super::RelationshipType;

/// One column-attribute projection. Custom entries are typed in by the user and
/// survive when the picked list is re-applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAttribute {
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

impl ColumnAttribute {
    pub fn picked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            custom: false,
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            custom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttribute {
    pub attribute_name: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
}

impl RelationshipAttribute {
    pub fn new(attribute_name: impl Into<String>, relationship_type: RelationshipType) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            relationship_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcelOptions {
    pub include_table_details: bool,
    pub include_columns: bool,
    pub include_keys: bool,
    pub include_privileges: bool,
    pub include_relationships: bool,
    pub include_solutions: bool,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            include_table_details: true,
            include_columns: true,
            include_keys: false,
            include_privileges: false,
            include_relationships: false,
            include_solutions: false,
        }
    }
}

impl ExcelOptions {
    pub fn everything() -> Self {
        Self {
            include_table_details: true,
            include_columns: true,
            include_keys: true,
            include_privileges: true,
            include_relationships: true,
            include_solutions: true,
        }
    }
}

/// User-configurable projections restored from host settings at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub table_attributes: Vec<String>,
    pub column_attributes: Vec<ColumnAttribute>,
    pub relationship_attributes: Vec<RelationshipAttribute>,
    pub excel_options: ExcelOptions,
}
