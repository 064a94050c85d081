//! History engine - read-side queries over a shared ledger

use civic_core::EntityType;
use civic_ledger::{ChangeLedger, ChangeRecord, ChangeType};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blame::{blame_records, BlameResult};
use crate::config::HistoryConfig;
use crate::diff::{diff_records, EntityDiff};
use crate::error::{HistoryError, HistoryResult};
use crate::query::{
    count_change_types, summarize_contributors, ContributorSummary, HistoryQuery, Page, PageRequest,
    Pagination,
};
use crate::timeline::TimelineEntry;

pub struct HistoryEngine {
    ledger: Arc<ChangeLedger>,
    config: HistoryConfig,
}

impl HistoryEngine {
    pub fn new(ledger: Arc<ChangeLedger>, config: HistoryConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Per-field attribution for one entity
    pub fn blame(&self, entity_type: EntityType, entity_id: &str) -> HistoryResult<BlameResult> {
        let records = self.chain(entity_type, entity_id)?;
        let result = blame_records(entity_type, entity_id, &records, &self.config);
        tracing::debug!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            fields = result.field_blame.len(),
            "Blame computed"
        );
        Ok(result)
    }

    /// Changes in the half-open chain window `[from_version, to_version)`
    pub fn diff(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        from_version: usize,
        to_version: usize,
    ) -> HistoryResult<EntityDiff> {
        let records = self.chain(entity_type, entity_id)?;
        Ok(diff_records(
            entity_type,
            entity_id,
            &records,
            from_version,
            to_version,
        ))
    }

    /// Matching records, newest first, one page at a time
    pub fn history(&self, query: &HistoryQuery, page: &PageRequest) -> HistoryResult<Page<ChangeRecord>> {
        let before = match page.cursor.as_deref() {
            Some(cursor) => Some(
                cursor
                    .parse::<u64>()
                    .map_err(|_| HistoryError::InvalidCursor(cursor.to_string()))?,
            ),
            None => None,
        };
        let limit = self.config.page_size(page.limit);

        let matching: Vec<ChangeRecord> = self
            .ledger
            .all()
            .into_iter()
            .rev()
            .filter(|r| query.matches(r))
            .collect();
        let total = matching.len();

        let mut remaining = matching
            .into_iter()
            .filter(|r| before.map_or(true, |seq| r.sequence < seq))
            .peekable();
        let data: Vec<ChangeRecord> = remaining.by_ref().take(limit).collect();
        let has_more = remaining.peek().is_some();
        let cursor = if has_more {
            data.last().map(|r| r.sequence.to_string())
        } else {
            None
        };

        Ok(Page {
            data,
            pagination: Pagination {
                cursor,
                has_more,
                total,
            },
        })
    }

    /// Chronological entries for one entity
    pub fn timeline(&self, entity_type: EntityType, entity_id: &str) -> HistoryResult<Vec<TimelineEntry>> {
        let mut records = self.chain(entity_type, entity_id)?;
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.sequence.cmp(&b.sequence)));
        Ok(records.iter().map(TimelineEntry::from).collect())
    }

    pub fn contributors(&self, query: &HistoryQuery) -> Vec<ContributorSummary> {
        let records = self.ledger.all();
        summarize_contributors(records.iter().filter(|r| query.matches(r)))
    }

    pub fn change_type_counts(&self, query: &HistoryQuery) -> BTreeMap<ChangeType, usize> {
        let records = self.ledger.all();
        count_change_types(records.iter().filter(|r| query.matches(r)))
    }

    fn chain(&self, entity_type: EntityType, entity_id: &str) -> HistoryResult<Vec<ChangeRecord>> {
        let records = self.ledger.records_for(entity_type, entity_id);
        if records.is_empty() {
            return Err(HistoryError::NotFound {
                entity_type,
                entity_id: entity_id.to_string(),
            });
        }
        Ok(records)
    }
}
