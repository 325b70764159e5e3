use serde::Serialize;

use crate::model::{
    ColumnAttribute, ExcelOptions, Preferences, RelationshipAttribute, RelationshipType,
    Solution, Table,
};

use super::{Action, Change};

const TABLE_CHOICE_EXCLUDES: [&str; 2] = ["DisplayName", "LogicalName"];
const COLUMN_CHOICE_EXCLUDES: [&str; 3] = ["AttributeType", "DisplayName", "LogicalName"];
const RELATIONSHIP_CHOICE_EXCLUDES: [&str; 2] = ["SchemaName", "RelationshipType"];

/// Browser state. Only `apply` mutates it; callers go through `ViewModelStore::dispatch`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewModel {
    tables: Vec<Table>,
    selected_tables: Vec<String>,
    solutions: Vec<Solution>,
    selected_solution: Option<Solution>,
    table_attributes: Vec<String>,
    column_attributes: Vec<ColumnAttribute>,
    relationship_attributes: Vec<RelationshipAttribute>,
    excel_options: ExcelOptions,
    epoch: u64,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, logical_name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.logical_name == logical_name)
    }

    fn table_mut(&mut self, logical_name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.logical_name == logical_name)
    }

    pub fn selected_table_names(&self) -> &[String] {
        &self.selected_tables
    }

    /// Open tabs in tab order.
    pub fn selected_tables(&self) -> Vec<&Table> {
        self.selected_tables
            .iter()
            .filter_map(|name| self.table(name))
            .collect()
    }

    pub fn is_open(&self, logical_name: &str) -> bool {
        self.selected_tables.iter().any(|name| name == logical_name)
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn selected_solution(&self) -> Option<&Solution> {
        self.selected_solution.as_ref()
    }

    pub fn table_attributes(&self) -> &[String] {
        &self.table_attributes
    }

    pub fn column_attributes(&self) -> &[ColumnAttribute] {
        &self.column_attributes
    }

    pub fn column_attribute_names(&self) -> Vec<&str> {
        self.column_attributes
            .iter()
            .map(|attr| attr.name.as_str())
            .collect()
    }

    pub fn relationship_attributes(&self, relationship_type: RelationshipType) -> Vec<&str> {
        self.relationship_attributes
            .iter()
            .filter(|attr| attr.relationship_type == relationship_type)
            .map(|attr| attr.attribute_name.as_str())
            .collect()
    }

    pub fn excel_options(&self) -> ExcelOptions {
        self.excel_options
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            table_attributes: self.table_attributes.clone(),
            column_attributes: self.column_attributes.clone(),
            relationship_attributes: self.relationship_attributes.clone(),
            excel_options: self.excel_options,
        }
    }

    /// Attribute names offered for the table list, taken from the first table.
    pub fn table_attribute_choices(&self) -> Vec<String> {
        self.tables
            .first()
            .map(|table| choices(table.attributes.names(), &TABLE_CHOICE_EXCLUDES))
            .unwrap_or_default()
    }

    pub fn column_attribute_choices(&self, logical_name: &str) -> Vec<String> {
        self.table(logical_name)
            .and_then(|table| table.columns.first())
            .map(|column| choices(column.attributes.names(), &COLUMN_CHOICE_EXCLUDES))
            .unwrap_or_default()
    }

    pub fn relationship_attribute_choices(
        &self,
        logical_name: &str,
        relationship_type: RelationshipType,
    ) -> Vec<String> {
        self.table(logical_name)
            .and_then(|table| table.relationships_of(relationship_type).next())
            .map(|rel| choices(rel.attributes.names(), &RELATIONSHIP_CHOICE_EXCLUDES))
            .unwrap_or_default()
    }

    pub fn apply(&mut self, action: Action) -> Change {
        match action {
            Action::ConnectionChanged => {
                self.solutions.clear();
                self.selected_solution = None;
                self.reset()
            }
            Action::SolutionSelected(solution) => {
                self.selected_solution = solution;
                self.reset()
            }
            Action::TablesLoaded { epoch, tables } => {
                if epoch != self.epoch {
                    return Change::Stale;
                }
                self.merge_tables(tables);
                Change::Tables
            }
            Action::SolutionsLoaded(solutions) => {
                self.solutions = solutions;
                Change::Solutions
            }
            Action::OpenTable(name) => {
                if self.is_open(&name) || self.table(&name).is_none() {
                    return Change::Unchanged;
                }
                self.selected_tables.push(name);
                Change::SelectedTables
            }
            Action::CloseTable(name) => {
                let before = self.selected_tables.len();
                self.selected_tables.retain(|open| *open != name);
                if self.selected_tables.len() == before {
                    Change::Unchanged
                } else {
                    Change::SelectedTables
                }
            }
            Action::ColumnsLoaded {
                epoch,
                table,
                items,
            } => self.write_aspect(epoch, table, |t| t.columns = items),
            Action::KeysLoaded {
                epoch,
                table,
                items,
            } => self.write_aspect(epoch, table, |t| t.keys = items),
            Action::PrivilegesLoaded {
                epoch,
                table,
                items,
            } => self.write_aspect(epoch, table, |t| t.privileges = items),
            Action::SolutionsForTableLoaded {
                epoch,
                table,
                items,
            } => self.write_aspect(epoch, table, |t| t.solutions = items),
            Action::RelationshipsLoaded {
                epoch,
                table,
                relationship_type,
                items,
            } => self.write_aspect(epoch, table, |t| {
                t.relationships
                    .retain(|rel| rel.relationship_type != relationship_type);
                t.relationships.extend(items.into_iter().map(|mut rel| {
                    rel.relationship_type = relationship_type;
                    rel
                }));
            }),
            Action::SetSearch {
                table,
                target,
                query,
            } => self.update_ui(table, |t| *t.ui.search_mut(target) = query),
            Action::SetRowSelection { table, target, ids } => {
                self.update_ui(table, |t| *t.ui.selection_mut(target) = ids)
            }
            Action::DetailTabChanged { table } => self.update_ui(table, |t| {
                t.ui.selected_relationships.clear();
                t.ui.relationship_search.clear();
            }),
            Action::TableAttributesApplied(names) => {
                self.table_attributes = names;
                Change::Preferences
            }
            Action::ColumnAttributesApplied(names) => {
                self.column_attributes.retain(|attr| attr.custom);
                let picked: Vec<ColumnAttribute> = names
                    .into_iter()
                    .filter(|name| !self.column_attributes.iter().any(|c| c.name == *name))
                    .map(ColumnAttribute::picked)
                    .collect();
                self.column_attributes.splice(0..0, picked);
                Change::Preferences
            }
            Action::CustomColumnAdded(name) => {
                let name = name.trim();
                if name.is_empty() || self.column_attributes.iter().any(|c| c.name == name) {
                    return Change::Unchanged;
                }
                self.column_attributes.push(ColumnAttribute::custom(name));
                Change::Preferences
            }
            Action::CustomColumnRemoved(name) => {
                let before = self.column_attributes.len();
                self.column_attributes
                    .retain(|attr| !(attr.custom && attr.name == name));
                if self.column_attributes.len() == before {
                    Change::Unchanged
                } else {
                    Change::Preferences
                }
            }
            Action::RelationshipAttributesApplied {
                relationship_type,
                names,
            } => {
                self.relationship_attributes
                    .retain(|attr| attr.relationship_type != relationship_type);
                self.relationship_attributes.extend(
                    names
                        .into_iter()
                        .map(|name| RelationshipAttribute::new(name, relationship_type)),
                );
                Change::Preferences
            }
            Action::ExcelOptionsChanged(options) => {
                self.excel_options = options;
                Change::Preferences
            }
            Action::DefaultsLoaded(preferences) => {
                self.table_attributes = preferences.table_attributes;
                self.column_attributes = preferences.column_attributes;
                self.relationship_attributes = preferences.relationship_attributes;
                self.excel_options = preferences.excel_options;
                Change::Preferences
            }
        }
    }

    fn reset(&mut self) -> Change {
        self.tables.clear();
        self.selected_tables.clear();
        self.epoch += 1;
        Change::Reset { epoch: self.epoch }
    }

    /// Fresh table rows replace the list; rows already present keep their loaded
    /// aspects and UI state.
    fn merge_tables(&mut self, incoming: Vec<Table>) {
        let mut previous = std::mem::take(&mut self.tables);
        self.tables = incoming
            .into_iter()
            .map(|mut fresh| {
                if let Some(pos) = previous
                    .iter()
                    .position(|old| old.logical_name == fresh.logical_name)
                {
                    let old = previous.swap_remove(pos);
                    fresh.columns = old.columns;
                    fresh.keys = old.keys;
                    fresh.relationships = old.relationships;
                    fresh.privileges = old.privileges;
                    fresh.solutions = old.solutions;
                    fresh.ui = old.ui;
                }
                fresh
            })
            .collect();
        let tables = &self.tables;
        self.selected_tables
            .retain(|name| tables.iter().any(|t| t.logical_name == *name));
    }

    fn write_aspect(
        &mut self,
        epoch: u64,
        table: String,
        write: impl FnOnce(&mut Table),
    ) -> Change {
        if epoch != self.epoch {
            return Change::Stale;
        }
        match self.table_mut(&table) {
            Some(target) => {
                write(target);
                Change::Table(table)
            }
            None => Change::Stale,
        }
    }

    fn update_ui(&mut self, table: String, update: impl FnOnce(&mut Table)) -> Change {
        match self.table_mut(&table) {
            Some(target) => {
                update(target);
                Change::Table(table)
            }
            None => Change::Unchanged,
        }
    }
}

fn choices<'a>(names: impl Iterator<Item = &'a str>, excluded: &[&str]) -> Vec<String> {
    names
        .filter(|name| !excluded.contains(name))
        .map(str::to_string)
        .collect()
}
