use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    Aspect, Attribute, AttributeBag, Column, Key, Privilege, Relationship, RelationshipType,
    Solution,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Columns,
    Relationships,
    Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelectionTarget {
    Columns,
    Relationships,
    Keys,
    Privileges,
}

/// Per-table state owned by the detail surfaces: search text and selected row ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUiState {
    pub column_search: String,
    pub relationship_search: String,
    pub attribute_search: String,
    pub selected_columns: BTreeSet<String>,
    pub selected_relationships: BTreeSet<String>,
    pub selected_keys: BTreeSet<String>,
    pub selected_privileges: BTreeSet<String>,
}

impl TableUiState {
    pub fn search_mut(&mut self, target: SearchTarget) -> &mut String {
        match target {
            SearchTarget::Columns => &mut self.column_search,
            SearchTarget::Relationships => &mut self.relationship_search,
            SearchTarget::Attributes => &mut self.attribute_search,
        }
    }

    pub fn selection_mut(&mut self, target: RowSelectionTarget) -> &mut BTreeSet<String> {
        match target {
            RowSelectionTarget::Columns => &mut self.selected_columns,
            RowSelectionTarget::Relationships => &mut self.selected_relationships,
            RowSelectionTarget::Keys => &mut self.selected_keys,
            RowSelectionTarget::Privileges => &mut self.selected_privileges,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub logical_name: String,
    pub display_name: String,
    pub metadata_id: String,
    pub attributes: AttributeBag,
    pub columns: Vec<Column>,
    pub keys: Vec<Key>,
    pub relationships: Vec<Relationship>,
    pub privileges: Vec<Privilege>,
    pub solutions: Vec<Solution>,
    #[serde(skip)]
    pub ui: TableUiState,
}

impl Table {
    pub fn new(logical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn relationships_of(
        &self,
        relationship_type: RelationshipType,
    ) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |rel| rel.relationship_type == relationship_type)
    }

    pub fn relationship_count(&self, relationship_type: RelationshipType) -> usize {
        self.relationships_of(relationship_type).count()
    }

    /// Whether the collection backing `aspect` holds anything yet.
    pub fn has_aspect(&self, aspect: Aspect) -> bool {
        match aspect {
            Aspect::Tables => true,
            Aspect::Columns => !self.columns.is_empty(),
            Aspect::Keys => !self.keys.is_empty(),
            Aspect::Privileges => !self.privileges.is_empty(),
            Aspect::Relationships(ty) => self.relationship_count(ty) > 0,
            Aspect::Solutions => !self.solutions.is_empty(),
        }
    }

    pub fn filtered_columns(&self) -> Vec<&Column> {
        let needle = self.ui.column_search.trim().to_lowercase();
        self.columns
            .iter()
            .filter(|col| needle.is_empty() || col.matches(&needle))
            .collect()
    }

    pub fn filtered_relationships(
        &self,
        relationship_type: RelationshipType,
    ) -> Vec<&Relationship> {
        let needle = self.ui.relationship_search.trim().to_lowercase();
        self.relationships_of(relationship_type)
            .filter(|rel| needle.is_empty() || rel.schema_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn filtered_attributes(&self) -> Vec<&Attribute> {
        let needle = self.ui.attribute_search.trim().to_lowercase();
        self.attributes
            .iter()
            .filter(|attr| needle.is_empty() || attr.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn selected_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|col| self.ui.selected_columns.contains(&col.logical_name))
            .collect()
    }

    pub fn selected_relationships(
        &self,
        relationship_type: RelationshipType,
    ) -> Vec<&Relationship> {
        self.relationships_of(relationship_type)
            .filter(|rel| self.ui.selected_relationships.contains(&rel.schema_name))
            .collect()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.logical_name == other.logical_name
    }
}

impl Eq for Table {}

#[cfg(test)]
mod tests {
    use crate::model::{Aspect, Column, Relationship, RelationshipType};

    use super::Table;

    fn table_with_columns() -> Table {
        let mut table = Table::new("account", "Account");
        table.columns = vec![
            Column::new("name", "Account Name"),
            Column::new("accountnumber", "Account Number"),
            Column::new("telephone1", "Main Phone"),
        ];
        table
    }

    #[test]
    fn column_search_matches_logical_or_display_name() {
        let mut table = table_with_columns();
        table.ui.column_search = "  PHONE ".to_string();
        let names: Vec<&str> = table
            .filtered_columns()
            .iter()
            .map(|c| c.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["telephone1"]);

        table.ui.column_search.clear();
        assert_eq!(table.filtered_columns().len(), 3);
    }

    #[test]
    fn relationship_search_is_scoped_to_one_type() {
        let mut table = Table::new("account", "Account");
        table.relationships = vec![
            Relationship::new("account_primary_contact", RelationshipType::ManyToOne),
            Relationship::new("account_contacts", RelationshipType::OneToMany),
            Relationship::new("account_tasks", RelationshipType::OneToMany),
        ];
        table.ui.relationship_search = " Contact".to_string();

        let names: Vec<&str> = table
            .filtered_relationships(RelationshipType::OneToMany)
            .iter()
            .map(|r| r.schema_name.as_str())
            .collect();
        assert_eq!(names, vec!["account_contacts"]);
        assert_eq!(
            table.filtered_relationships(RelationshipType::ManyToMany).len(),
            0
        );

        table.ui.relationship_search.clear();
        assert_eq!(
            table.filtered_relationships(RelationshipType::OneToMany).len(),
            2
        );
    }

    #[test]
    fn attribute_search_matches_names_ignoring_case() {
        let mut table = Table::new("account", "Account");
        table.attributes.push("ObjectTypeCode", "1");
        table.attributes.push("IsCustomEntity", "false");
        table.attributes.push("EntitySetName", "accounts");
        table.ui.attribute_search = "entity ".to_string();

        let names: Vec<&str> = table
            .filtered_attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["IsCustomEntity", "EntitySetName"]);

        table.ui.attribute_search = "accounts".to_string();
        assert!(table.filtered_attributes().is_empty());
    }

    #[test]
    fn relationship_aspect_is_tracked_per_type() {
        let mut table = Table::new("account", "Account");
        table.relationships = vec![Relationship::new(
            "account_contacts",
            RelationshipType::ManyToMany,
        )];

        assert!(table.has_aspect(Aspect::Relationships(RelationshipType::ManyToMany)));
        assert!(!table.has_aspect(Aspect::Relationships(RelationshipType::OneToMany)));
        assert!(!table.has_aspect(Aspect::Columns));
    }

    #[test]
    fn selected_columns_follow_row_ids() {
        let mut table = table_with_columns();
        table.ui.selected_columns.insert("name".to_string());
        table.ui.selected_columns.insert("missing".to_string());

        let selected: Vec<&str> = table
            .selected_columns()
            .iter()
            .map(|c| c.logical_name.as_str())
            .collect();
        assert_eq!(selected, vec!["name"]);
    }

    #[test]
    fn equality_is_by_logical_name() {
        let mut other = Table::new("account", "Renamed");
        other.metadata_id = "different".to_string();
        assert_eq!(Table::new("account", "Account"), other);
    }
}
