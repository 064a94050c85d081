//! History errors

use civic_core::EntityType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("No change records for {entity_type} {entity_id}")]
    NotFound {
        entity_type: EntityType,
        entity_id: String,
    },

    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;
