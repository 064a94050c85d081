//! Per-field attribution replayed from the ledger

use chrono::{DateTime, Utc};
use civic_core::{ChangeAuthor, EntityType, FieldValue};
use civic_ledger::{ChangeRecord, ChangeType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::HistoryConfig;

/// Who last touched a field, and who else ever did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBlame {
    pub field: String,
    /// Absent when the last change removed the value
    pub current_value: Option<FieldValue>,
    pub last_changed_by: ChangeAuthor,
    pub last_changed_at: DateTime<Utc>,
    pub last_change_id: String,
    pub last_commit_hash: String,
    pub reason: String,
    pub total_changes: usize,
    /// Distinct author ids
    pub contributors: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorResponsibility {
    pub author: ChangeAuthor,
    /// Change type of each record, chronological
    pub actions: Vec<ChangeType>,
    pub last_action_at: DateTime<Utc>,
    pub accountability: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlameResult {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub current_version: u32,
    pub total_records: usize,
    pub field_blame: BTreeMap<String, FieldBlame>,
    /// Highest accountability first
    pub overall_responsibility: Vec<AuthorResponsibility>,
}

/// Replay records into a blame result
///
/// Later timestamps win; equal timestamps fall back to ledger insertion order.
pub fn blame_records(
    entity_type: EntityType,
    entity_id: &str,
    records: &[ChangeRecord],
    config: &HistoryConfig,
) -> BlameResult {
    let mut ordered: Vec<&ChangeRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.sequence.cmp(&b.sequence)));

    let mut field_blame: BTreeMap<String, FieldBlame> = BTreeMap::new();
    let mut authors: HashMap<String, AuthorResponsibility> = HashMap::new();

    for record in &ordered {
        for change in &record.changes {
            let entry = field_blame
                .entry(change.field.clone())
                .or_insert_with(|| FieldBlame {
                    field: change.field.clone(),
                    current_value: None,
                    last_changed_by: record.changed_by.clone(),
                    last_changed_at: record.timestamp,
                    last_change_id: String::new(),
                    last_commit_hash: String::new(),
                    reason: String::new(),
                    total_changes: 0,
                    contributors: BTreeSet::new(),
                });
            entry.current_value = change.new.clone();
            entry.last_changed_by = record.changed_by.clone();
            entry.last_changed_at = record.timestamp;
            entry.last_change_id = record.change_id.clone();
            entry.last_commit_hash = record.commit_hash.clone();
            entry.reason = change.reason.clone().unwrap_or_else(|| record.reason.clone());
            entry.total_changes += 1;
            entry.contributors.insert(record.changed_by.id.clone());
        }

        let responsibility = authors
            .entry(record.changed_by.id.clone())
            .or_insert_with(|| AuthorResponsibility {
                author: record.changed_by.clone(),
                actions: Vec::new(),
                last_action_at: record.timestamp,
                accountability: 0,
            });
        responsibility.actions.push(record.change_type);
        responsibility.last_action_at = record.timestamp;
    }

    let mut overall_responsibility: Vec<AuthorResponsibility> = authors
        .into_values()
        .map(|mut r| {
            r.accountability = config.accountability(r.actions.len());
            r
        })
        .collect();
    overall_responsibility.sort_by(|a, b| {
        b.accountability
            .cmp(&a.accountability)
            .then(b.last_action_at.cmp(&a.last_action_at))
            .then(a.author.id.cmp(&b.author.id))
    });

    BlameResult {
        entity_type,
        entity_id: entity_id.to_string(),
        current_version: records.iter().map(|r| r.version).max().unwrap_or(0),
        total_records: records.len(),
        field_blame,
        overall_responsibility,
    }
}
