use std::collections::BTreeSet;

use crate::model::{
    Column, ExcelOptions, Key, Preferences, Privilege, Relationship, RelationshipType,
    RowSelectionTarget, SearchTarget, Solution, Table,
};

/// Epoch-tagged aspect results name their table by logical name.
#[derive(Debug, Clone)]
pub enum Action {
    /// Connection created, switched or removed.
    ConnectionChanged,
    /// Clears tables and open tabs and switches the solution filter in one step.
    SolutionSelected(Option<Solution>),
    TablesLoaded {
        epoch: u64,
        tables: Vec<Table>,
    },
    SolutionsLoaded(Vec<Solution>),
    OpenTable(String),
    CloseTable(String),
    ColumnsLoaded {
        epoch: u64,
        table: String,
        items: Vec<Column>,
    },
    KeysLoaded {
        epoch: u64,
        table: String,
        items: Vec<Key>,
    },
    PrivilegesLoaded {
        epoch: u64,
        table: String,
        items: Vec<Privilege>,
    },
    RelationshipsLoaded {
        epoch: u64,
        table: String,
        relationship_type: RelationshipType,
        items: Vec<Relationship>,
    },
    SolutionsForTableLoaded {
        epoch: u64,
        table: String,
        items: Vec<Solution>,
    },
    SetSearch {
        table: String,
        target: SearchTarget,
        query: String,
    },
    SetRowSelection {
        table: String,
        target: RowSelectionTarget,
        ids: BTreeSet<String>,
    },
    DetailTabChanged {
        table: String,
    },
    TableAttributesApplied(Vec<String>),
    /// Replaces the picked column attributes; custom entries stay.
    ColumnAttributesApplied(Vec<String>),
    CustomColumnAdded(String),
    CustomColumnRemoved(String),
    RelationshipAttributesApplied {
        relationship_type: RelationshipType,
        names: Vec<String>,
    },
    ExcelOptionsChanged(ExcelOptions),
    DefaultsLoaded(Preferences),
}

/// What a dispatched action did to the model. Observers are only told about
/// the variants that carry a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    /// An aspect or table result arrived for a generation or table that no longer exists.
    Stale,
    Reset { epoch: u64 },
    Tables,
    Solutions,
    SelectedTables,
    Table(String),
    Preferences,
}

impl Change {
    pub fn is_change(&self) -> bool {
        !matches!(self, Change::Unchanged | Change::Stale)
    }
}
