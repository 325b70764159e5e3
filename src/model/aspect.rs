use std::fmt;

use serde::{Deserialize, Serialize};

use super::RelationshipType;

/// One lazily loaded collection. `Tables` is the session-wide table list; every
/// other variant hangs off a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aspect {
    Tables,
    Columns,
    Keys,
    Privileges,
    Relationships(RelationshipType),
    Solutions,
}

impl Aspect {
    /// Every per-table aspect, in export order.
    pub const TABLE_ASPECTS: [Aspect; 7] = [
        Aspect::Columns,
        Aspect::Keys,
        Aspect::Privileges,
        Aspect::Relationships(RelationshipType::OneToMany),
        Aspect::Relationships(RelationshipType::ManyToOne),
        Aspect::Relationships(RelationshipType::ManyToMany),
        Aspect::Solutions,
    ];

    pub fn noun(self) -> &'static str {
        match self {
            Aspect::Tables => "tables",
            Aspect::Columns => "columns",
            Aspect::Keys => "keys",
            Aspect::Privileges => "privileges",
            Aspect::Relationships(_) => "relationships",
            Aspect::Solutions => "solutions",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aspect::Relationships(ty) => write!(f, "relationships ({ty})"),
            other => f.write_str(other.noun()),
        }
    }
}
