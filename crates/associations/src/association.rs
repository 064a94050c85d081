//! Associations between entities and civic objects

use chrono::{DateTime, Utc};
use civic_core::{ChangeAuthor, EntityKind, FieldValue, Versioned};
use civic_ledger::{AuditMetadata, ChangeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::involvement::InvolvementRecord;

/// Closed vocabulary of relationship types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvolvementType {
    // Government roles
    ElectedRepresentative,
    ElectedExecutive,
    AppointedOfficial,
    CommitteeMember,

    // Private interests
    Owner,
    BoardMember,
    Executive,
    Investor,
    Lobbyist,

    // Other relationships
    Employee,
    CampaignDonor,
    BillSponsor,
    BillCosponsor,
    BillVoter,
    CaseParty,
    Witness,
    Contractor,
    Advisor,
    FamilyMember,
}

impl InvolvementType {
    /// Public office held on behalf of a government body
    pub fn is_government_role(&self) -> bool {
        matches!(
            self,
            InvolvementType::ElectedRepresentative
                | InvolvementType::ElectedExecutive
                | InvolvementType::AppointedOfficial
                | InvolvementType::CommitteeMember
        )
    }

    /// Private stake or influence position
    pub fn is_private_interest(&self) -> bool {
        matches!(
            self,
            InvolvementType::Owner
                | InvolvementType::BoardMember
                | InvolvementType::Executive
                | InvolvementType::Investor
                | InvolvementType::Lobbyist
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Significance {
    Primary,
    #[default]
    Secondary,
}

impl Significance {
    pub fn is_primary(&self) -> bool {
        matches!(self, Significance::Primary)
    }
}

/// Denormalized reference to one end of an association
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub id: String,
    pub subject: EntityRef,
    pub object: EntityRef,
    pub involvement_type: InvolvementType,
    pub significance: Significance,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub financial_value: Option<Decimal>,
    pub verified: bool,
    pub involvement_records: Vec<InvolvementRecord>,
    pub version: u32,
    pub change_history: Vec<String>,
    pub audit: AuditMetadata,
}

impl Association {
    /// The end of this association that is not `id`
    pub fn other_end(&self, id: &str) -> Option<&EntityRef> {
        if self.subject.id == id {
            Some(&self.object)
        } else if self.object.id == id {
            Some(&self.subject)
        } else {
            None
        }
    }

    pub(crate) fn apply_record(&mut self, record: &ChangeRecord) {
        self.version = record.version;
        self.change_history.push(record.change_id.clone());
        self.audit.apply(record);
    }
}

impl Versioned for Association {
    fn versioned_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("subject_id", Some(self.subject.id.clone().into())),
            ("object_id", Some(self.object.id.clone().into())),
            (
                "involvement_type",
                Some(self.involvement_type.to_string().into()),
            ),
            ("significance", Some(self.significance.to_string().into())),
            ("start_date", Some(self.start_date.into())),
            ("end_date", self.end_date.map(FieldValue::from)),
            ("is_active", Some(self.is_active.into())),
            ("financial_value", self.financial_value.map(FieldValue::from)),
            ("verified", Some(self.verified.into())),
        ]
    }
}

/// Input for `create_association`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssociation {
    pub subject: EntityRef,
    pub object: EntityRef,
    pub involvement_type: InvolvementType,
    #[serde(default)]
    pub significance: Significance,
    #[serde(default = "Utc::now")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub financial_value: Option<Decimal>,
    #[serde(default)]
    pub verified: bool,
}

fn default_active() -> bool {
    true
}

impl NewAssociation {
    pub fn new(subject: EntityRef, object: EntityRef, involvement_type: InvolvementType) -> Self {
        Self {
            subject,
            object,
            involvement_type,
            significance: Significance::default(),
            start_date: Utc::now(),
            end_date: None,
            is_active: true,
            financial_value: None,
            verified: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.significance = Significance::Primary;
        self
    }

    pub fn financial_value(mut self, value: Decimal) -> Self {
        self.financial_value = Some(value);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn starting(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = start_date;
        self
    }

    pub(crate) fn into_association(self, id: String, author: &ChangeAuthor) -> Association {
        Association {
            id,
            subject: self.subject,
            object: self.object,
            involvement_type: self.involvement_type,
            significance: self.significance,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            financial_value: self.financial_value,
            verified: self.verified,
            involvement_records: Vec::new(),
            version: 0,
            change_history: Vec::new(),
            audit: AuditMetadata::pending(author),
        }
    }
}

/// Partial update for `update_association`
///
/// Endpoints and involvement type are fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociationUpdate {
    #[serde(default)]
    pub significance: Option<Significance>,
    #[serde(default)]
    pub end_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub financial_value: Option<Option<Decimal>>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl AssociationUpdate {
    /// Close the activity window at `end_date`
    pub fn end(end_date: DateTime<Utc>) -> Self {
        Self {
            end_date: Some(Some(end_date)),
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn verify() -> Self {
        Self {
            verified: Some(true),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, association: &mut Association) {
        if let Some(significance) = self.significance {
            association.significance = significance;
        }
        if let Some(end_date) = self.end_date {
            association.end_date = end_date;
        }
        if let Some(active) = self.is_active {
            association.is_active = active;
        }
        if let Some(value) = self.financial_value {
            association.financial_value = value;
        }
        if let Some(verified) = self.verified {
            association.verified = verified;
        }
    }
}
