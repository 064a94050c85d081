//! People

use civic_core::{ChangeAuthor, FieldValue, Versioned};
use civic_ledger::{AuditMetadata, ChangeRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store::TrackedEntity;

/// How thoroughly a person's identity has been verified
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationLevel {
    #[default]
    Unverified,
    Basic,
    Verified,
    Official,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonStatus {
    #[default]
    Active,
    Inactive,
    Retired,
    Deceased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub legal_name: String,
    pub preferred_name: Option<String>,
    pub regions: Vec<String>,
    pub verification_level: VerificationLevel,
    /// 0..=100
    pub reputation_score: u32,
    pub status: PersonStatus,
    pub version: u32,
    /// Change ids, oldest first
    pub change_history: Vec<String>,
    pub audit: AuditMetadata,
}

impl Person {
    /// Name to show in summaries and denormalized references
    pub fn display_name(&self) -> &str {
        self.preferred_name.as_deref().unwrap_or(&self.legal_name)
    }
}

impl Versioned for Person {
    fn versioned_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("legal_name", Some(self.legal_name.clone().into())),
            ("preferred_name", self.preferred_name.clone().map(FieldValue::from)),
            ("regions", Some(self.regions.clone().into())),
            (
                "verification_level",
                Some(self.verification_level.to_string().into()),
            ),
            (
                "reputation_score",
                Some(i64::from(self.reputation_score).into()),
            ),
            ("status", Some(self.status.to_string().into())),
        ]
    }
}

impl TrackedEntity for Person {
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

/// Input for `register_person`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
    pub legal_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub verification_level: VerificationLevel,
    #[serde(default)]
    pub reputation_score: u32,
    #[serde(default)]
    pub status: PersonStatus,
}

impl NewPerson {
    pub fn new(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            ..Self::default()
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.regions.push(region.into());
        self
    }

    pub(crate) fn into_person(self, id: String, author: &ChangeAuthor) -> Person {
        Person {
            id,
            legal_name: self.legal_name,
            preferred_name: self.preferred_name,
            regions: self.regions,
            verification_level: self.verification_level,
            reputation_score: self.reputation_score,
            status: self.status,
            version: 0,
            change_history: Vec::new(),
            audit: AuditMetadata::pending(author),
        }
    }
}

/// Partial update for `update_person`
///
/// `None` leaves a field untouched. `preferred_name: Some(None)` clears it.
/// The id is not part of the update and can never change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonUpdate {
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<Option<String>>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub verification_level: Option<VerificationLevel>,
    #[serde(default)]
    pub reputation_score: Option<u32>,
    #[serde(default)]
    pub status: Option<PersonStatus>,
}

impl PersonUpdate {
    pub fn legal_name(name: impl Into<String>) -> Self {
        Self {
            legal_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn status(status: PersonStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, person: &mut Person) {
        if let Some(name) = self.legal_name {
            person.legal_name = name;
        }
        if let Some(preferred) = self.preferred_name {
            person.preferred_name = preferred;
        }
        if let Some(regions) = self.regions {
            person.regions = regions;
        }
        if let Some(level) = self.verification_level {
            person.verification_level = level;
        }
        if let Some(score) = self.reputation_score {
            person.reputation_score = score;
        }
        if let Some(status) = self.status {
            person.status = status;
        }
    }
}

/// AND-combined search predicates; unset fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonCriteria {
    /// Case-insensitive substring of legal or preferred name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub verification_level: Option<VerificationLevel>,
    #[serde(default)]
    pub status: Option<PersonStatus>,
    #[serde(default)]
    pub min_reputation: Option<u32>,
}

impl PersonCriteria {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, person: &Person) -> bool {
        if let Some(ref needle) = self.name {
            let needle = needle.to_lowercase();
            let in_legal = person.legal_name.to_lowercase().contains(&needle);
            let in_preferred = person
                .preferred_name
                .as_ref()
                .is_some_and(|p| p.to_lowercase().contains(&needle));
            if !in_legal && !in_preferred {
                return false;
            }
        }
        if let Some(ref region) = self.region {
            if !person.regions.iter().any(|r| r == region) {
                return false;
            }
        }
        if self.verification_level.is_some_and(|l| l != person.verification_level) {
            return false;
        }
        if self.status.is_some_and(|s| s != person.status) {
            return false;
        }
        if self.min_reputation.is_some_and(|min| person.reputation_score < min) {
            return false;
        }
        true
    }
}

/// Denormalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: String,
    pub legal_name: String,
    pub display_name: String,
    pub regions: Vec<String>,
    pub verification_level: VerificationLevel,
    pub reputation_score: u32,
    pub status: PersonStatus,
    pub version: u32,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            legal_name: person.legal_name.clone(),
            display_name: person.display_name().to_string(),
            regions: person.regions.clone(),
            verification_level: person.verification_level,
            reputation_score: person.reputation_score,
            status: person.status,
            version: person.version,
        }
    }
}
