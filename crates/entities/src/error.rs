//! Entity store errors

use civic_core::{CoreError, EntityType};
use civic_ledger::LedgerError;
use thiserror::Error;

/// Errors from the entity store
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EntityError {
    pub fn person_not_found(id: impl Into<String>) -> Self {
        EntityError::NotFound {
            entity_type: EntityType::Person,
            id: id.into(),
        }
    }

    pub fn organization_not_found(id: impl Into<String>) -> Self {
        EntityError::NotFound {
            entity_type: EntityType::Organization,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EntityError::NotFound { .. })
    }
}

/// Result type for entity store operations
pub type EntityResult<T> = Result<T, EntityError>;
