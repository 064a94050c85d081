//! Change records and drafts

use chrono::{DateTime, Utc};
use civic_core::{ChangeAuthor, EntityType, FieldChange};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What kind of mutation a change record describes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    Sign,
    Ratify,
    Veto,
    Override,
    Repeal,
    Amend,
    Verify,
}

/// Verification state of a change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
    Disputed,
}

/// Sealed ledger entry
///
/// Immutable once created. `parent_commit_hash` is the `commit_hash` of the
/// previous record for the same entity, absent for the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_id: String,
    pub commit_hash: String,
    pub parent_commit_hash: Option<String>,

    /// Global insertion order, 1-based
    pub sequence: u64,
    /// Position in this entity's chain, 1-based
    pub version: u32,

    pub entity_type: EntityType,
    pub entity_id: String,
    pub change_type: ChangeType,
    pub changes: Vec<FieldChange>,

    pub changed_by: ChangeAuthor,
    pub authorized_by: Option<ChangeAuthor>,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub legal_basis: Option<String>,
    pub related_documents: Vec<String>,

    /// Signature placeholder, see [`crate::chain::signature_placeholder`]
    pub signature: String,
    pub witnesses: Vec<ChangeAuthor>,
    pub verification_status: VerificationStatus,
    pub is_public: bool,
    pub immutable: bool,
}

impl ChangeRecord {
    /// Field paths touched by this record
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.field.as_str())
    }

    pub fn touches_field(&self, field: &str) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }
}

/// A change before it is sealed into the ledger
///
/// The ledger fills in ids, version, sequence, parent hash, commit hash
/// and signature at append time.
#[derive(Debug, Clone)]
pub struct ChangeDraft {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub change_type: ChangeType,
    pub changes: Vec<FieldChange>,
    pub changed_by: ChangeAuthor,
    pub reason: String,
    pub authorized_by: Option<ChangeAuthor>,
    pub legal_basis: Option<String>,
    pub related_documents: Vec<String>,
    pub witnesses: Vec<ChangeAuthor>,
    pub verification_status: VerificationStatus,
    pub is_public: bool,
    pub immutable: bool,
    /// Defaults to now at append time
    pub timestamp: Option<DateTime<Utc>>,
    /// If set, the append fails unless the sealed record gets this version
    pub expected_version: Option<u32>,
}

impl ChangeDraft {
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        change_type: ChangeType,
        changed_by: ChangeAuthor,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            change_type,
            changes: Vec::new(),
            changed_by,
            reason: reason.into(),
            authorized_by: None,
            legal_basis: None,
            related_documents: Vec::new(),
            witnesses: Vec::new(),
            verification_status: VerificationStatus::default(),
            is_public: true,
            immutable: false,
            timestamp: None,
            expected_version: None,
        }
    }

    pub fn changes(mut self, changes: Vec<FieldChange>) -> Self {
        self.changes = changes;
        self
    }

    pub fn change(mut self, change: FieldChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn authorized_by(mut self, authorizer: ChangeAuthor) -> Self {
        self.authorized_by = Some(authorizer);
        self
    }

    pub fn legal_basis(mut self, basis: impl Into<String>) -> Self {
        self.legal_basis = Some(basis.into());
        self
    }

    pub fn related_document(mut self, document: impl Into<String>) -> Self {
        self.related_documents.push(document.into());
        self
    }

    pub fn witness(mut self, witness: ChangeAuthor) -> Self {
        self.witnesses.push(witness);
        self
    }

    pub fn verification_status(mut self, status: VerificationStatus) -> Self {
        self.verification_status = status;
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn expect_version(mut self, version: u32) -> Self {
        self.expected_version = Some(version);
        self
    }
}
