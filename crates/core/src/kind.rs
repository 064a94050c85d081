//! Entity type vocabularies

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Entity types that own a change chain in the ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Organization,
    Association,
    ConflictOfInterest,
}

/// Kinds of thing that can sit at either end of an association
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Person,
    Organization,
    Bill,
    Case,
    Contract,
    Committee,
    FinancialInstrument,
    Document,
}

impl EntityKind {
    /// Kinds registered in the entity store (the rest are external references)
    pub fn is_registered(&self) -> bool {
        matches!(self, EntityKind::Person | EntityKind::Organization)
    }
}

/// Owner kind of an ownership stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKind {
    Person,
    Organization,
}

impl From<OwnerKind> for EntityKind {
    fn from(kind: OwnerKind) -> Self {
        match kind {
            OwnerKind::Person => EntityKind::Person,
            OwnerKind::Organization => EntityKind::Organization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_display_roundtrip() {
        assert_eq!(EntityType::ConflictOfInterest.to_string(), "CONFLICT_OF_INTEREST");
        let parsed: EntityType = "ORGANIZATION".parse().unwrap();
        assert_eq!(parsed, EntityType::Organization);
    }

    #[test]
    fn test_entity_kind_serde() {
        let json = serde_json::to_string(&EntityKind::FinancialInstrument).unwrap();
        assert_eq!(json, "\"FINANCIAL_INSTRUMENT\"");
        assert!(EntityKind::Person.is_registered());
        assert!(!EntityKind::Bill.is_registered());
    }
}
