//! Hash chain utilities for ledger integrity

use chrono::{DateTime, Utc};
use civic_core::{canonical_digest, digest, ChangeAuthor, CoreError, EntityType, FieldChange};
use serde::Serialize;
use thiserror::Error;

use crate::record::{ChangeRecord, ChangeType};

/// Everything in a record except `commit_hash`, `signature` and
/// `verification_status`, in a fixed order
#[derive(Serialize)]
struct CommitPayload<'a> {
    change_id: &'a str,
    parent_commit_hash: Option<&'a str>,
    sequence: u64,
    version: u32,
    entity_type: EntityType,
    entity_id: &'a str,
    change_type: ChangeType,
    changes: &'a [FieldChange],
    changed_by: &'a ChangeAuthor,
    authorized_by: Option<&'a ChangeAuthor>,
    timestamp: &'a DateTime<Utc>,
    reason: &'a str,
    legal_basis: Option<&'a str>,
    related_documents: &'a [String],
    witnesses: &'a [ChangeAuthor],
    is_public: bool,
    immutable: bool,
}

/// Calculate the SHA256 commit hash of a record's content
pub fn calculate_commit_hash(record: &ChangeRecord) -> Result<String, CoreError> {
    let payload = CommitPayload {
        change_id: &record.change_id,
        parent_commit_hash: record.parent_commit_hash.as_deref(),
        sequence: record.sequence,
        version: record.version,
        entity_type: record.entity_type,
        entity_id: &record.entity_id,
        change_type: record.change_type,
        changes: &record.changes,
        changed_by: &record.changed_by,
        authorized_by: record.authorized_by.as_ref(),
        timestamp: &record.timestamp,
        reason: &record.reason,
        legal_basis: record.legal_basis.as_deref(),
        related_documents: &record.related_documents,
        witnesses: &record.witnesses,
        is_public: record.is_public,
        immutable: record.immutable,
    };
    canonical_digest(&payload)
}

/// Signature placeholder binding an author to a commit hash
///
/// Not a real signature: anyone can recompute it. It only proves the
/// record was not edited after the author field was set.
pub fn signature_placeholder(commit_hash: &str, author: &ChangeAuthor) -> String {
    digest(format!("{}:{}", author.id, commit_hash))
}

/// Errors in hash chain verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Broken link at version {version}: expected parent {expected:?}, got {actual:?}")]
    BrokenLink {
        version: u32,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("Invalid hash at version {version}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        version: u32,
        expected: String,
        actual: String,
    },

    #[error("Invalid signature at version {version}")]
    InvalidSignature { version: u32 },

    #[error("Version gap: expected {expected}, got {actual}")]
    InvalidVersion { expected: u32, actual: u32 },

    #[error("Record {change_id} belongs to a different entity")]
    MixedEntities { change_id: String },

    #[error("Could not recompute hash: {0}")]
    Unhashable(String),
}

/// Verify one entity's chain, given its records in chain order
pub fn verify_chain(records: &[ChangeRecord]) -> Result<(), ChainError> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let mut expected_parent: Option<String> = None;

    for (i, record) in records.iter().enumerate() {
        if record.entity_type != first.entity_type || record.entity_id != first.entity_id {
            return Err(ChainError::MixedEntities {
                change_id: record.change_id.clone(),
            });
        }

        let expected_version = i as u32 + 1;
        if record.version != expected_version {
            return Err(ChainError::InvalidVersion {
                expected: expected_version,
                actual: record.version,
            });
        }

        if record.parent_commit_hash != expected_parent {
            return Err(ChainError::BrokenLink {
                version: record.version,
                expected: expected_parent,
                actual: record.parent_commit_hash.clone(),
            });
        }

        let calculated =
            calculate_commit_hash(record).map_err(|e| ChainError::Unhashable(e.to_string()))?;
        if record.commit_hash != calculated {
            return Err(ChainError::InvalidHash {
                version: record.version,
                expected: calculated,
                actual: record.commit_hash.clone(),
            });
        }

        if record.signature != signature_placeholder(&record.commit_hash, &record.changed_by) {
            return Err(ChainError::InvalidSignature {
                version: record.version,
            });
        }

        expected_parent = Some(record.commit_hash.clone());
    }

    Ok(())
}
