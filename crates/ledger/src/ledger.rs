//! Change Ledger - append-only store of change records
//!
//! One global insertion order plus a per-entity chain index. Appends take a
//! single short write lock: the version, parent hash and sequence are read
//! and the record is pushed without any other writer observing the head in
//! between. Readers clone under a read lock and never see a half-appended
//! record.

use chrono::Utc;
use civic_core::{new_id, EntityType};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::chain::{calculate_commit_hash, signature_placeholder, verify_chain};
use crate::error::{LedgerError, LedgerResult};
use crate::record::{ChangeDraft, ChangeRecord};

type EntityKey = (EntityType, String);

#[derive(Debug, Default)]
struct LedgerState {
    /// All records in insertion order
    records: Vec<ChangeRecord>,
    /// Indices into `records`, per entity, in chain order
    chains: HashMap<EntityKey, Vec<usize>>,
    /// change_id -> index into `records`
    by_change_id: HashMap<String, usize>,
}

/// Append-only, hash-chained change ledger
#[derive(Debug, Default)]
pub struct ChangeLedger {
    state: RwLock<LedgerState>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal a draft and append it to its entity's chain
    pub fn append(&self, draft: ChangeDraft) -> LedgerResult<ChangeRecord> {
        if draft.changed_by.id.trim().is_empty() {
            return Err(LedgerError::EmptyAuthor);
        }
        if draft.entity_id.trim().is_empty() {
            return Err(LedgerError::EmptyEntityId);
        }

        let mut state = self.state.write();
        let key = (draft.entity_type, draft.entity_id.clone());

        let (version, parent_commit_hash) = match state.chains.get(&key) {
            Some(chain) => {
                let head = chain.last().map(|&idx| &state.records[idx]);
                (
                    chain.len() as u32 + 1,
                    head.map(|record| record.commit_hash.clone()),
                )
            }
            None => (1, None),
        };

        if let Some(expected) = draft.expected_version {
            if expected != version {
                return Err(LedgerError::VersionConflict {
                    entity_type: draft.entity_type,
                    entity_id: draft.entity_id,
                    expected,
                    actual: version - 1,
                });
            }
        }

        let mut record = ChangeRecord {
            change_id: new_id(),
            commit_hash: String::new(),
            parent_commit_hash,
            sequence: state.records.len() as u64 + 1,
            version,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            change_type: draft.change_type,
            changes: draft.changes,
            changed_by: draft.changed_by,
            authorized_by: draft.authorized_by,
            timestamp: draft.timestamp.unwrap_or_else(Utc::now),
            reason: draft.reason,
            legal_basis: draft.legal_basis,
            related_documents: draft.related_documents,
            signature: String::new(),
            witnesses: draft.witnesses,
            verification_status: draft.verification_status,
            is_public: draft.is_public,
            immutable: draft.immutable,
        };
        record.commit_hash = calculate_commit_hash(&record)?;
        record.signature = signature_placeholder(&record.commit_hash, &record.changed_by);

        let idx = state.records.len();
        state.by_change_id.insert(record.change_id.clone(), idx);
        state.chains.entry(key).or_default().push(idx);
        state.records.push(record.clone());

        tracing::debug!(
            entity_type = %record.entity_type,
            entity_id = %record.entity_id,
            change_type = %record.change_type,
            version = record.version,
            commit = %record.commit_hash,
            "Change record appended"
        );

        Ok(record)
    }

    /// Records for one entity in chain order (empty if unknown)
    pub fn records_for(&self, entity_type: EntityType, entity_id: &str) -> Vec<ChangeRecord> {
        let state = self.state.read();
        state
            .chains
            .get(&(entity_type, entity_id.to_string()))
            .map(|chain| chain.iter().map(|&idx| state.records[idx].clone()).collect())
            .unwrap_or_default()
    }

    /// Latest record for one entity
    pub fn head(&self, entity_type: EntityType, entity_id: &str) -> Option<ChangeRecord> {
        let state = self.state.read();
        state
            .chains
            .get(&(entity_type, entity_id.to_string()))
            .and_then(|chain| chain.last())
            .map(|&idx| state.records[idx].clone())
    }

    /// Number of records in one entity's chain
    pub fn chain_len(&self, entity_type: EntityType, entity_id: &str) -> usize {
        self.state
            .read()
            .chains
            .get(&(entity_type, entity_id.to_string()))
            .map_or(0, Vec::len)
    }

    pub fn get(&self, change_id: &str) -> Option<ChangeRecord> {
        let state = self.state.read();
        state
            .by_change_id
            .get(change_id)
            .map(|&idx| state.records[idx].clone())
    }

    /// Snapshot of every record in insertion order
    pub fn all(&self) -> Vec<ChangeRecord> {
        self.state.read().records.clone()
    }

    /// Every (entity type, id) that owns a chain
    pub fn entities(&self) -> Vec<(EntityType, String)> {
        let mut keys: Vec<_> = self.state.read().chains.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify one entity's hash chain
    pub fn verify_entity(&self, entity_type: EntityType, entity_id: &str) -> LedgerResult<usize> {
        let records = self.records_for(entity_type, entity_id);
        if records.is_empty() {
            return Err(LedgerError::UnknownEntity {
                entity_type,
                entity_id: entity_id.to_string(),
            });
        }
        verify_chain(&records)?;
        Ok(records.len())
    }

    /// Verify every chain in the ledger, returning the number of chains checked
    pub fn verify_all(&self) -> LedgerResult<usize> {
        let entities = self.entities();
        for (entity_type, entity_id) in &entities {
            self.verify_entity(*entity_type, entity_id)?;
        }
        Ok(entities.len())
    }
}
