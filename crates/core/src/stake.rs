//! Ownership stakes

use crate::error::CoreError;
use crate::kind::OwnerKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One owner's share of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipStake {
    pub owner_id: String,
    pub owner_kind: OwnerKind,
    /// Percentage owned, 0..=100
    pub percentage: Decimal,
    pub voting_rights: bool,
}

impl OwnershipStake {
    /// Create a stake, rejecting percentages outside 0..=100
    pub fn new(
        owner_id: impl Into<String>,
        owner_kind: OwnerKind,
        percentage: Decimal,
        voting_rights: bool,
    ) -> Result<Self, CoreError> {
        let stake = Self {
            owner_id: owner_id.into(),
            owner_kind,
            percentage,
            voting_rights,
        };
        stake.validate()?;
        Ok(stake)
    }

    /// Range check for stakes built from public fields or deserialized input
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.percentage < Decimal::ZERO || self.percentage > Decimal::ONE_HUNDRED {
            return Err(CoreError::InvalidPercentage(self.percentage));
        }
        Ok(())
    }

    pub fn person(owner_id: impl Into<String>, percentage: Decimal) -> Result<Self, CoreError> {
        Self::new(owner_id, OwnerKind::Person, percentage, true)
    }

    pub fn organization(owner_id: impl Into<String>, percentage: Decimal) -> Result<Self, CoreError> {
        Self::new(owner_id, OwnerKind::Organization, percentage, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_stake() {
        let stake = OwnershipStake::person("P1", dec!(40)).unwrap();
        assert_eq!(stake.owner_kind, OwnerKind::Person);
        assert!(stake.voting_rights);
    }

    #[test]
    fn test_percentage_out_of_range() {
        assert!(matches!(
            OwnershipStake::organization("O1", dec!(100.5)),
            Err(CoreError::InvalidPercentage(_))
        ));
        assert!(OwnershipStake::organization("O1", dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_deserialized_stake() {
        let stake: OwnershipStake = serde_json::from_str(
            r#"{"owner_id":"O1","owner_kind":"ORGANIZATION","percentage":"250","voting_rights":true}"#,
        )
        .unwrap();
        assert!(matches!(stake.validate(), Err(CoreError::InvalidPercentage(_))));
    }
}
