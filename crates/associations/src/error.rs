//! Association store errors

use civic_core::CoreError;
use civic_ledger::LedgerError;
use thiserror::Error;

/// Errors from the association store
#[derive(Error, Debug)]
pub enum AssociationError {
    #[error("Association not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Observer {observer} failed: {reason}")]
    Observer { observer: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for association operations
pub type AssociationResult<T> = Result<T, AssociationError>;
