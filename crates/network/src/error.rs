//! Network analyzer errors

use civic_core::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Entity not found in registry or associations: {0}")]
    UnknownEntity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
