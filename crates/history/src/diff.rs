//! Version-range diffs

use chrono::{DateTime, Utc};
use civic_core::{EntityType, FieldChange};
use civic_ledger::ChangeRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Aggregate of every field change in `[from_version, to_version)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDiff {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub from_version: usize,
    pub to_version: usize,
    /// Empty when `from_version` is out of range
    pub from_commit_hash: String,
    /// Empty when `to_version` is out of range
    pub to_commit_hash: String,
    pub changes: Vec<FieldChange>,
    pub added_fields: BTreeSet<String>,
    pub removed_fields: BTreeSet<String>,
    /// Touched in the window but neither added nor removed
    pub modified_fields: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub time_span: Option<TimeSpan>,
    pub record_count: usize,
}

impl EntityDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Every field touched in the window
    pub fn touched_fields(&self) -> BTreeSet<String> {
        self.changes.iter().map(|c| c.field.clone()).collect()
    }
}

/// Diff over a chain-ordered slice of one entity's records
///
/// Indices are zero-based positions in the chain. An empty or out-of-range
/// window yields an empty diff rather than an error.
pub fn diff_records(
    entity_type: EntityType,
    entity_id: &str,
    records: &[ChangeRecord],
    from_version: usize,
    to_version: usize,
) -> EntityDiff {
    let from_commit_hash = records
        .get(from_version)
        .map(|r| r.commit_hash.clone())
        .unwrap_or_default();
    let to_commit_hash = to_version
        .checked_sub(1)
        .and_then(|last| records.get(last))
        .map(|r| r.commit_hash.clone())
        .unwrap_or_default();

    let window: &[ChangeRecord] = if from_version < to_version && to_version <= records.len() {
        &records[from_version..to_version]
    } else {
        tracing::debug!(
            entity_id = %entity_id,
            from_version,
            to_version,
            chain_len = records.len(),
            "Diff window empty or out of range"
        );
        &[]
    };

    let mut changes = Vec::new();
    let mut added_fields = BTreeSet::new();
    let mut removed_fields = BTreeSet::new();
    let mut touched = BTreeSet::new();
    let mut authors = BTreeSet::new();

    for record in window {
        authors.insert(record.changed_by.id.clone());
        for change in &record.changes {
            if change.is_addition() {
                added_fields.insert(change.field.clone());
            }
            if change.is_removal() {
                removed_fields.insert(change.field.clone());
            }
            touched.insert(change.field.clone());
            changes.push(change.clone());
        }
    }

    let modified_fields = touched
        .into_iter()
        .filter(|f| !added_fields.contains(f) && !removed_fields.contains(f))
        .collect();

    let time_span = match (
        window.iter().map(|r| r.timestamp).min(),
        window.iter().map(|r| r.timestamp).max(),
    ) {
        (Some(start), Some(end)) => Some(TimeSpan { start, end }),
        _ => None,
    };

    EntityDiff {
        entity_type,
        entity_id: entity_id.to_string(),
        from_version,
        to_version,
        from_commit_hash,
        to_commit_hash,
        changes,
        added_fields,
        removed_fields,
        modified_fields,
        authors,
        time_span,
        record_count: window.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::{ChangeAuthor, FieldValue};
    use civic_ledger::{ChangeDraft, ChangeLedger, ChangeType};

    fn ledger_with_history() -> ChangeLedger {
        let ledger = ChangeLedger::new();
        let alice = ChangeAuthor::new("A", "Alice");
        let bob = ChangeAuthor::new("B", "Bob");

        ledger
            .append(
                ChangeDraft::new(EntityType::Person, "P1", ChangeType::Create, alice.clone(), "created")
                    .change(FieldChange::new("legal_name", None, Some("Jane".into())))
                    .change(FieldChange::new("nickname", None, Some("JJ".into()))),
            )
            .unwrap();
        ledger
            .append(
                ChangeDraft::new(EntityType::Person, "P1", ChangeType::Update, bob.clone(), "rename")
                    .change(FieldChange::new("legal_name", Some("Jane".into()), Some("Janet".into()))),
            )
            .unwrap();
        ledger
            .append(
                ChangeDraft::new(EntityType::Person, "P1", ChangeType::Update, alice, "drop nickname")
                    .change(FieldChange::new("nickname", Some(FieldValue::from("JJ")), None)),
            )
            .unwrap();
        ledger
    }

    #[test]
    fn test_full_window() {
        let ledger = ledger_with_history();
        let records = ledger.records_for(EntityType::Person, "P1");
        let diff = diff_records(EntityType::Person, "P1", &records, 0, 3);

        assert_eq!(diff.changes.len(), 4);
        assert_eq!(diff.record_count, 3);
        assert!(diff.added_fields.contains("legal_name"));
        assert!(diff.added_fields.contains("nickname"));
        assert!(diff.removed_fields.contains("nickname"));
        assert!(diff.modified_fields.is_empty());
        assert_eq!(diff.authors.len(), 2);
        assert_eq!(diff.from_commit_hash, records[0].commit_hash);
        assert_eq!(diff.to_commit_hash, records[2].commit_hash);
        assert!(diff.time_span.is_some());
    }

    #[test]
    fn test_middle_window_is_modification() {
        let ledger = ledger_with_history();
        let records = ledger.records_for(EntityType::Person, "P1");
        let diff = diff_records(EntityType::Person, "P1", &records, 1, 2);

        assert_eq!(diff.modified_fields, BTreeSet::from(["legal_name".to_string()]));
        assert!(diff.added_fields.is_empty());
        assert_eq!(diff.authors, BTreeSet::from(["B".to_string()]));
    }

    #[test]
    fn test_union_of_single_steps_equals_full_range() {
        let ledger = ledger_with_history();
        let records = ledger.records_for(EntityType::Person, "P1");
        let full = diff_records(EntityType::Person, "P1", &records, 0, records.len());

        let stepped: Vec<FieldChange> = (0..records.len())
            .flat_map(|i| diff_records(EntityType::Person, "P1", &records, i, i + 1).changes)
            .collect();
        assert_eq!(full.changes, stepped);
    }

    #[test]
    fn test_out_of_range_is_soft() {
        let ledger = ledger_with_history();
        let records = ledger.records_for(EntityType::Person, "P1");

        let diff = diff_records(EntityType::Person, "P1", &records, 2, 10);
        assert!(diff.is_empty());
        assert_eq!(diff.from_commit_hash, records[2].commit_hash);
        assert_eq!(diff.to_commit_hash, "");

        let reversed = diff_records(EntityType::Person, "P1", &records, 2, 1);
        assert!(reversed.is_empty());
        assert!(reversed.time_span.is_none());
    }
}
