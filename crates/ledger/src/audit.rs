//! Audit metadata carried by every versioned entity

use chrono::{DateTime, Utc};
use civic_core::ChangeAuthor;
use crate::record::ChangeRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMetadata {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub created_by: ChangeAuthor,
    pub last_modified_at: DateTime<Utc>,
    pub last_changed_by: ChangeAuthor,
    pub total_changes: u32,
}

impl AuditMetadata {
    /// Metadata for an entity about to receive its first record
    pub fn pending(author: &ChangeAuthor) -> Self {
        let now = Utc::now();
        Self {
            version: 0,
            created_at: now,
            created_by: author.clone(),
            last_modified_at: now,
            last_changed_by: author.clone(),
            total_changes: 0,
        }
    }

    /// Fold a sealed change record into the metadata
    pub fn apply(&mut self, record: &ChangeRecord) {
        if record.version == 1 {
            self.created_at = record.timestamp;
            self.created_by = record.changed_by.clone();
        }
        self.version = record.version;
        self.last_modified_at = record.timestamp;
        self.last_changed_by = record.changed_by.clone();
        self.total_changes += 1;
    }
}
