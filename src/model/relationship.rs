use std::fmt;

use serde::{Deserialize, Serialize};

use super::AttributeBag;

/// The remote API does not say which kind a relationship record is, so the
/// gateway tags each record with the kind it asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "OneToManyRelationship")]
    OneToMany,
    #[serde(rename = "ManyToOneRelationship")]
    ManyToOne,
    #[serde(rename = "ManyToManyRelationship")]
    ManyToMany,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 3] = [
        RelationshipType::OneToMany,
        RelationshipType::ManyToOne,
        RelationshipType::ManyToMany,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::OneToMany => "OneToManyRelationship",
            RelationshipType::ManyToOne => "ManyToOneRelationship",
            RelationshipType::ManyToMany => "ManyToManyRelationship",
        }
    }

    /// Navigation property on `EntityDefinitions` holding this kind.
    pub fn path_segment(self) -> &'static str {
        match self {
            RelationshipType::OneToMany => "OneToManyRelationships",
            RelationshipType::ManyToOne => "ManyToOneRelationships",
            RelationshipType::ManyToMany => "ManyToManyRelationships",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        RelationshipType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| format!("unsupported relationship type: {raw}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub schema_name: String,
    pub relationship_type: RelationshipType,
    pub attributes: AttributeBag,
}

impl Relationship {
    pub fn new(schema_name: impl Into<String>, relationship_type: RelationshipType) -> Self {
        Self {
            schema_name: schema_name.into(),
            relationship_type,
            attributes: AttributeBag::new(),
        }
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.schema_name == other.schema_name
    }
}

impl Eq for Relationship {}

#[cfg(test)]
mod tests {
    use super::RelationshipType;

    #[test]
    fn parses_type_names_case_insensitively() {
        assert_eq!(
            "manytomanyrelationship".parse::<RelationshipType>(),
            Ok(RelationshipType::ManyToMany)
        );
        assert_eq!(
            "OneToManyRelationship".parse::<RelationshipType>(),
            Ok(RelationshipType::OneToMany)
        );
        assert!("OneToOne".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn path_segment_is_pluralised_type_name() {
        for ty in RelationshipType::ALL {
            assert_eq!(ty.path_segment(), format!("{}s", ty.as_str()));
        }
    }
}
