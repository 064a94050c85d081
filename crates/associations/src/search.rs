//! Association search predicates and summaries

use civic_core::EntityKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::association::{Association, InvolvementType, Significance};

/// AND-combined predicates; unset fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociationCriteria {
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub subject_kind: Option<EntityKind>,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_kind: Option<EntityKind>,
    #[serde(default)]
    pub involvement_type: Option<InvolvementType>,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// `Some(true)` only associations with a financial value, `Some(false)` only without
    #[serde(default)]
    pub has_financial_value: Option<bool>,
    #[serde(default)]
    pub min_financial_value: Option<Decimal>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl AssociationCriteria {
    pub fn matches(&self, association: &Association) -> bool {
        if self
            .subject_id
            .as_ref()
            .is_some_and(|id| id != &association.subject.id)
        {
            return false;
        }
        if self.subject_kind.is_some_and(|k| k != association.subject.kind) {
            return false;
        }
        if self
            .object_id
            .as_ref()
            .is_some_and(|id| id != &association.object.id)
        {
            return false;
        }
        if self.object_kind.is_some_and(|k| k != association.object.kind) {
            return false;
        }
        if self
            .involvement_type
            .is_some_and(|t| t != association.involvement_type)
        {
            return false;
        }
        if self.is_active.is_some_and(|a| a != association.is_active) {
            return false;
        }
        if self
            .has_financial_value
            .is_some_and(|has| has != association.financial_value.is_some())
        {
            return false;
        }
        if let Some(min) = self.min_financial_value {
            match association.financial_value {
                Some(value) if value >= min => {}
                _ => return false,
            }
        }
        if self.verified.is_some_and(|v| v != association.verified) {
            return false;
        }
        true
    }
}

/// Denormalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationSummary {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub object_id: String,
    pub object_name: String,
    pub involvement_type: InvolvementType,
    pub significance: Significance,
    pub is_active: bool,
    pub financial_value: Option<Decimal>,
    pub verified: bool,
    pub involvement_count: usize,
    pub version: u32,
}

impl From<&Association> for AssociationSummary {
    fn from(association: &Association) -> Self {
        Self {
            id: association.id.clone(),
            subject_id: association.subject.id.clone(),
            subject_name: association.subject.name.clone(),
            object_id: association.object.id.clone(),
            object_name: association.object.name.clone(),
            involvement_type: association.involvement_type,
            significance: association.significance,
            is_active: association.is_active,
            financial_value: association.financial_value,
            verified: association.verified,
            involvement_count: association.involvement_records.len(),
            version: association.version,
        }
    }
}
