//! Entity model for the browser: plain records keyed by their natural name.

pub mod aspect;
pub mod attribute;
pub mod column;
pub mod connection;
pub mod key;
pub mod privilege;
pub mod relationship;
pub mod selection;
pub mod solution;
pub mod table;

pub use aspect::Aspect;
pub use attribute::{Attribute, AttributeBag};
pub use column::Column;
pub use connection::{Connection, ConnectionEvent};
pub use key::Key;
pub use privilege::Privilege;
pub use relationship::{Relationship, RelationshipType};
pub use selection::{ColumnAttribute, ExcelOptions, Preferences, RelationshipAttribute};
pub use solution::Solution;
pub use table::{RowSelectionTarget, SearchTarget, Table, TableUiState};
