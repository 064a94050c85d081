//! Conflict-of-interest findings

use chrono::{DateTime, Utc};
use civic_associations::{Association, InvolvementType};
use civic_core::{ChangeAuthor, FieldValue, Versioned};
use civic_ledger::{AuditMetadata, ChangeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::ConflictConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    OwnershipStake,
    BoardMembership,
    LobbyingRelationship,
    CampaignContribution,
    Employment,
    FinancialInterest,
}

impl From<InvolvementType> for ConflictType {
    /// Derived from the private interest's involvement type
    ///
    /// `CampaignDonor` and `Employee` are not private interests, so detection
    /// never yields `CampaignContribution`, and yields `Employment` only via `Executive`.
    fn from(involvement: InvolvementType) -> Self {
        match involvement {
            InvolvementType::Owner => ConflictType::OwnershipStake,
            InvolvementType::BoardMember => ConflictType::BoardMembership,
            InvolvementType::Lobbyist => ConflictType::LobbyingRelationship,
            InvolvementType::CampaignDonor => ConflictType::CampaignContribution,
            InvolvementType::Employee | InvolvementType::Executive => ConflictType::Employment,
            _ => ConflictType::FinancialInterest,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// CRITICAL on a large private financial value, otherwise by primary significance
    pub fn assess(government: &Association, private: &Association, config: &ConflictConfig) -> Self {
        if private
            .financial_value
            .is_some_and(|v| v > config.critical_financial_threshold)
        {
            return Severity::Critical;
        }
        match (
            government.significance.is_primary(),
            private.significance.is_primary(),
        ) {
            (true, true) => Severity::High,
            (true, false) | (false, true) => Severity::Medium,
            (false, false) => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictStatus {
    #[default]
    Detected,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ConflictStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConflictStatus::Resolved | ConflictStatus::Dismissed)
    }

    pub fn can_transition_to(&self, next: ConflictStatus) -> bool {
        match self {
            ConflictStatus::Detected => matches!(
                next,
                ConflictStatus::Reviewed | ConflictStatus::Resolved | ConflictStatus::Dismissed
            ),
            ConflictStatus::Reviewed => {
                matches!(next, ConflictStatus::Resolved | ConflictStatus::Dismissed)
            }
            ConflictStatus::Resolved | ConflictStatus::Dismissed => false,
        }
    }
}

/// A flagged (government role, private interest) pair for one person
///
/// Not removed when the underlying associations change; the status is moved
/// explicitly by a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictOfInterest {
    pub id: String,
    pub person_id: String,
    pub person_name: String,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub government_association_id: String,
    pub government_role: InvolvementType,
    pub government_body: String,
    pub private_interest_association_id: String,
    pub private_interest: InvolvementType,
    pub private_entity: String,
    pub financial_value: Option<Decimal>,
    pub detected_at: DateTime<Utc>,
    pub status: ConflictStatus,
    pub reviewed_by: Option<ChangeAuthor>,
    pub notes: Option<String>,
    pub version: u32,
    pub change_history: Vec<String>,
    pub audit: AuditMetadata,
}

impl ConflictOfInterest {
    pub(crate) fn detect(
        id: String,
        government: &Association,
        private: &Association,
        config: &ConflictConfig,
        author: &ChangeAuthor,
    ) -> Self {
        Self {
            id,
            person_id: government.subject.id.clone(),
            person_name: government.subject.name.clone(),
            conflict_type: ConflictType::from(private.involvement_type),
            severity: Severity::assess(government, private, config),
            government_association_id: government.id.clone(),
            government_role: government.involvement_type,
            government_body: government.object.name.clone(),
            private_interest_association_id: private.id.clone(),
            private_interest: private.involvement_type,
            private_entity: private.object.name.clone(),
            financial_value: private.financial_value,
            detected_at: Utc::now(),
            status: ConflictStatus::Detected,
            reviewed_by: None,
            notes: None,
            version: 0,
            change_history: Vec::new(),
            audit: AuditMetadata::pending(author),
        }
    }

    /// Pair key used for deduplication
    pub fn pair(&self) -> (String, String) {
        (
            self.government_association_id.clone(),
            self.private_interest_association_id.clone(),
        )
    }

    pub(crate) fn apply_record(&mut self, record: &ChangeRecord) {
        self.version = record.version;
        self.change_history.push(record.change_id.clone());
        self.audit.apply(record);
    }
}

impl Versioned for ConflictOfInterest {
    fn versioned_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("person_id", Some(self.person_id.clone().into())),
            ("conflict_type", Some(self.conflict_type.to_string().into())),
            ("severity", Some(self.severity.to_string().into())),
            (
                "government_association_id",
                Some(self.government_association_id.clone().into()),
            ),
            (
                "private_interest_association_id",
                Some(self.private_interest_association_id.clone().into()),
            ),
            ("financial_value", self.financial_value.map(FieldValue::from)),
            ("status", Some(self.status.to_string().into())),
            (
                "reviewed_by",
                self.reviewed_by.as_ref().map(|a| FieldValue::from(a.id.clone())),
            ),
            ("notes", self.notes.clone().map(FieldValue::from)),
        ]
    }
}
