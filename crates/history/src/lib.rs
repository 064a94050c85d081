//! Civic Registry History Engine
//!
//! Read-side views derived purely from the change ledger: per-field blame,
//! version-range diffs, filtered and paginated history, timelines and
//! contributor aggregation. Holds no state beyond its configuration.

pub mod blame;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod query;
pub mod timeline;

pub use blame::{AuthorResponsibility, BlameResult, FieldBlame};
pub use config::HistoryConfig;
pub use diff::{EntityDiff, TimeSpan};
pub use engine::HistoryEngine;
pub use error::{HistoryError, HistoryResult};
pub use query::{ContributorSummary, HistoryQuery, Page, PageRequest, Pagination};
pub use timeline::TimelineEntry;
