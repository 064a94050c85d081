//! Beneficial ownership results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person at the end of an ownership chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficialOwner {
    pub person_id: String,
    pub person_name: Option<String>,
    /// Product of stake percentages along the path, seeded at 100
    pub effective_percentage: Decimal,
    /// Organization ids from the analyzed organization down to the person
    pub path: Vec<String>,
    pub voting_rights: bool,
}

impl BeneficialOwner {
    /// Number of ownership hops between the organization and the person
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipAnalysis {
    pub organization_id: String,
    pub owners: Vec<BeneficialOwner>,
    /// Organizations that reappeared on their own chain; not expanded again
    pub circular_references: Vec<String>,
    /// Organizations reached through more than one acyclic path
    #[serde(default)]
    pub shared_references: Vec<String>,
}

impl OwnershipAnalysis {
    pub fn has_cycles(&self) -> bool {
        !self.circular_references.is_empty()
    }

    /// Sum of effective percentages attributed to people
    pub fn identified_percentage(&self) -> Decimal {
        self.owners.iter().map(|o| o.effective_percentage).sum()
    }
}
