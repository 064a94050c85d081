//! Ledger errors

use civic_core::{CoreError, EntityType};
use thiserror::Error;

use crate::chain::ChainError;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Change author id cannot be empty")]
    EmptyAuthor,

    #[error("Entity id cannot be empty")]
    EmptyEntityId,

    #[error("Version conflict on {entity_type} {entity_id}: expected version {expected}, chain is at {actual}")]
    VersionConflict {
        entity_type: EntityType,
        entity_id: String,
        expected: u32,
        actual: u32,
    },

    #[error("No change records for {entity_type} {entity_id}")]
    UnknownEntity {
        entity_type: EntityType,
        entity_id: String,
    },

    #[error("Hash chain verification failed: {0}")]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
