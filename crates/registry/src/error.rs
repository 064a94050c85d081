//! Registry errors

use civic_associations::AssociationError;
use civic_conflict::ConflictError;
use civic_entities::EntityError;
use civic_history::HistoryError;
use civic_ledger::LedgerError;
use civic_network::NetworkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] civic_core::CoreError),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// True for any unknown-id failure from the underlying crates
    pub fn is_not_found(&self) -> bool {
        match self {
            RegistryError::Entity(e) => e.is_not_found(),
            RegistryError::Association(AssociationError::NotFound(_)) => true,
            RegistryError::History(HistoryError::NotFound { .. }) => true,
            RegistryError::Conflict(ConflictError::NotFound(_)) => true,
            RegistryError::Network(NetworkError::NotFound { .. })
            | RegistryError::Network(NetworkError::UnknownEntity(_)) => true,
            _ => false,
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
