//! Organizations and their ownership structure

use civic_core::{ChangeAuthor, FieldValue, OwnerKind, OwnershipStake, Versioned};
use civic_ledger::{AuditMetadata, ChangeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store::TrackedEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    #[default]
    Corporation,
    Nonprofit,
    GovernmentAgency,
    PoliticalParty,
    PoliticalActionCommittee,
    LaborUnion,
    TradeAssociation,
    Partnership,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationStatus {
    #[default]
    Active,
    Inactive,
    Dissolved,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub legal_name: String,
    pub organization_type: OrganizationType,
    pub status: OrganizationStatus,
    /// Ordered ownership stakes; may reference other organizations, cycles allowed
    pub ownership: Vec<OwnershipStake>,
    pub version: u32,
    pub change_history: Vec<String>,
    pub audit: AuditMetadata,
}

impl Organization {
    /// Sum of all recorded stake percentages
    pub fn total_ownership(&self) -> Decimal {
        self.ownership.iter().map(|s| s.percentage).sum()
    }

    pub fn owners_of_kind(&self, kind: OwnerKind) -> impl Iterator<Item = &OwnershipStake> {
        self.ownership.iter().filter(move |s| s.owner_kind == kind)
    }
}

impl Versioned for Organization {
    fn versioned_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("legal_name", Some(self.legal_name.clone().into())),
            (
                "organization_type",
                Some(self.organization_type.to_string().into()),
            ),
            ("status", Some(self.status.to_string().into())),
            ("ownership", Some(self.ownership.clone().into())),
        ]
    }
}

impl TrackedEntity for Organization {
    fn id(&self) -> &str {
        &self.id
    }

    fn legal_name(&self) -> &str {
        &self.legal_name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn apply_record(&mut self, record: &ChangeRecord) {
        self.version = record.version;
        self.change_history.push(record.change_id.clone());
        self.audit.apply(record);
    }
}

/// Input for `register_organization`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrganization {
    pub legal_name: String,
    #[serde(default)]
    pub organization_type: OrganizationType,
    #[serde(default)]
    pub status: OrganizationStatus,
    #[serde(default)]
    pub ownership: Vec<OwnershipStake>,
}

impl NewOrganization {
    pub fn new(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            ..Self::default()
        }
    }

    pub fn organization_type(mut self, organization_type: OrganizationType) -> Self {
        self.organization_type = organization_type;
        self
    }

    pub fn stake(mut self, stake: OwnershipStake) -> Self {
        self.ownership.push(stake);
        self
    }

    pub(crate) fn into_organization(self, id: String, author: &ChangeAuthor) -> Organization {
        Organization {
            id,
            legal_name: self.legal_name,
            organization_type: self.organization_type,
            status: self.status,
            ownership: self.ownership,
            version: 0,
            change_history: Vec::new(),
            audit: AuditMetadata::pending(author),
        }
    }
}

/// Partial update for `update_organization`; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationUpdate {
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub organization_type: Option<OrganizationType>,
    #[serde(default)]
    pub status: Option<OrganizationStatus>,
    #[serde(default)]
    pub ownership: Option<Vec<OwnershipStake>>,
}

impl OrganizationUpdate {
    pub fn legal_name(name: impl Into<String>) -> Self {
        Self {
            legal_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn ownership(stakes: Vec<OwnershipStake>) -> Self {
        Self {
            ownership: Some(stakes),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, organization: &mut Organization) {
        if let Some(name) = self.legal_name {
            organization.legal_name = name;
        }
        if let Some(organization_type) = self.organization_type {
            organization.organization_type = organization_type;
        }
        if let Some(status) = self.status {
            organization.status = status;
        }
        if let Some(ownership) = self.ownership {
            organization.ownership = ownership;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationCriteria {
    /// Case-insensitive substring of the legal name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organization_type: Option<OrganizationType>,
    #[serde(default)]
    pub status: Option<OrganizationStatus>,
    /// Only organizations with at least one stake held by this owner
    #[serde(default)]
    pub owned_by: Option<String>,
}

impl OrganizationCriteria {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, organization: &Organization) -> bool {
        if let Some(ref needle) = self.name {
            if !organization
                .legal_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self
            .organization_type
            .is_some_and(|t| t != organization.organization_type)
        {
            return false;
        }
        if self.status.is_some_and(|s| s != organization.status) {
            return false;
        }
        if let Some(ref owner) = self.owned_by {
            if !organization.ownership.iter().any(|s| &s.owner_id == owner) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: String,
    pub legal_name: String,
    pub organization_type: OrganizationType,
    pub status: OrganizationStatus,
    pub owner_count: usize,
    pub version: u32,
}

impl From<&Organization> for OrganizationSummary {
    fn from(organization: &Organization) -> Self {
        Self {
            id: organization.id.clone(),
            legal_name: organization.legal_name.clone(),
            organization_type: organization.organization_type,
            status: organization.status,
            owner_count: organization.ownership.len(),
            version: organization.version,
        }
    }
}
