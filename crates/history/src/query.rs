//! History filters, pagination and contributor aggregation

use chrono::{DateTime, Utc};
use civic_core::{ChangeAuthor, EntityType};
use civic_ledger::{ChangeRecord, ChangeType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// AND-combined ledger filters; unset fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub entity_id: Option<String>,
    /// Any of these change types; empty matches all
    #[serde(default)]
    pub change_types: Vec<ChangeType>,
    #[serde(default)]
    pub author_id: Option<String>,
    /// Only records touching this field path
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_only: bool,
}

impl HistoryQuery {
    pub fn entity(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    pub fn author(author_id: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &ChangeRecord) -> bool {
        if self.entity_type.is_some_and(|t| t != record.entity_type) {
            return false;
        }
        if self.entity_id.as_ref().is_some_and(|id| id != &record.entity_id) {
            return false;
        }
        if !self.change_types.is_empty() && !self.change_types.contains(&record.change_type) {
            return false;
        }
        if self
            .author_id
            .as_ref()
            .is_some_and(|id| id != &record.changed_by.id)
        {
            return false;
        }
        if self.field.as_ref().is_some_and(|f| !record.touches_field(f)) {
            return false;
        }
        if self.since.is_some_and(|since| record.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| record.timestamp > until) {
            return false;
        }
        if self.public_only && !record.is_public {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    /// Opaque cursor from a previous page
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit: Some(limit),
        }
    }

    pub fn after(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Pass back to fetch the next page; absent on the last page
    pub cursor: Option<String>,
    pub has_more: bool,
    /// Matching records across all pages
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorSummary {
    pub author: ChangeAuthor,
    pub change_count: usize,
    pub change_types: BTreeMap<ChangeType, usize>,
    pub first_change: DateTime<Utc>,
    pub last_change: DateTime<Utc>,
}

/// Group matching records by author, most active first
pub fn summarize_contributors<'a>(
    records: impl IntoIterator<Item = &'a ChangeRecord>,
) -> Vec<ContributorSummary> {
    let mut by_author: HashMap<String, ContributorSummary> = HashMap::new();
    for record in records {
        let summary = by_author
            .entry(record.changed_by.id.clone())
            .or_insert_with(|| ContributorSummary {
                author: record.changed_by.clone(),
                change_count: 0,
                change_types: BTreeMap::new(),
                first_change: record.timestamp,
                last_change: record.timestamp,
            });
        summary.change_count += 1;
        *summary.change_types.entry(record.change_type).or_default() += 1;
        summary.first_change = summary.first_change.min(record.timestamp);
        summary.last_change = summary.last_change.max(record.timestamp);
    }

    let mut contributors: Vec<ContributorSummary> = by_author.into_values().collect();
    contributors.sort_by(|a, b| {
        b.change_count
            .cmp(&a.change_count)
            .then(a.author.id.cmp(&b.author.id))
    });
    contributors
}

pub fn count_change_types<'a>(
    records: impl IntoIterator<Item = &'a ChangeRecord>,
) -> BTreeMap<ChangeType, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.change_type).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_ledger::{ChangeDraft, ChangeLedger};

    #[test]
    fn test_query_filters() {
        let ledger = ChangeLedger::new();
        let alice = ChangeAuthor::new("A", "Alice");
        let record = ledger
            .append(
                ChangeDraft::new(EntityType::Organization, "O1", ChangeType::Amend, alice, "fix")
                    .change(civic_core::FieldChange::new("legal_name", None, Some("Acme".into())))
                    .private(),
            )
            .unwrap();

        assert!(HistoryQuery::default().matches(&record));
        assert!(HistoryQuery::entity(EntityType::Organization, "O1").matches(&record));
        assert!(!HistoryQuery::entity(EntityType::Person, "O1").matches(&record));
        assert!(HistoryQuery::author("A").matches(&record));

        let by_field = HistoryQuery {
            field: Some("status".to_string()),
            ..HistoryQuery::default()
        };
        assert!(!by_field.matches(&record));

        let public = HistoryQuery {
            public_only: true,
            ..HistoryQuery::default()
        };
        assert!(!public.matches(&record));

        let typed = HistoryQuery {
            change_types: vec![ChangeType::Create, ChangeType::Amend],
            ..HistoryQuery::default()
        };
        assert!(typed.matches(&record));
    }
}
