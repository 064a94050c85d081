//! Conflict detector configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConflictResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// Private-interest financial value above which a conflict is CRITICAL
    #[serde(default = "default_critical_financial_threshold")]
    pub critical_financial_threshold: Decimal,
}

fn default_critical_financial_threshold() -> Decimal {
    Decimal::new(1_000_000, 0)
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            critical_financial_threshold: default_critical_financial_threshold(),
        }
    }
}

impl ConflictConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> ConflictResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
