//! Conflict detector errors

use civic_associations::AssociationError;
use civic_ledger::LedgerError;
use thiserror::Error;

use crate::conflict::ConflictStatus;

#[derive(Error, Debug)]
pub enum ConflictError {
    #[error("Conflict not found: {0}")]
    NotFound(String),

    #[error("Cannot move conflict from {from} to {to}")]
    InvalidTransition {
        from: ConflictStatus,
        to: ConflictStatus,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Association error: {0}")]
    Association(#[from] AssociationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConflictResult<T> = Result<T, ConflictError>;
