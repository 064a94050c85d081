//! Core errors

use thiserror::Error;

/// Errors from core utilities
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid ownership percentage {0}: must be within 0..=100")]
    InvalidPercentage(rust_decimal::Decimal),
}
