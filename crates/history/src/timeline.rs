//! Chronological per-entity timeline

use chrono::{DateTime, Utc};
use civic_core::ChangeAuthor;
use civic_ledger::{ChangeRecord, ChangeType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub version: u32,
    pub change_id: String,
    pub commit_hash: String,
    pub change_type: ChangeType,
    pub changed_by: ChangeAuthor,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub fields: Vec<String>,
}

impl From<&ChangeRecord> for TimelineEntry {
    fn from(record: &ChangeRecord) -> Self {
        Self {
            version: record.version,
            change_id: record.change_id.clone(),
            commit_hash: record.commit_hash.clone(),
            change_type: record.change_type,
            changed_by: record.changed_by.clone(),
            timestamp: record.timestamp,
            reason: record.reason.clone(),
            fields: record.fields().map(str::to_string).collect(),
        }
    }
}
