//! Registry configuration
//!
//! One JSON document with a section per engine. Missing sections and
//! missing fields fall back to their defaults.

use civic_conflict::ConflictConfig;
use civic_history::HistoryConfig;
use civic_network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RegistryResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub conflict: ConflictConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl RegistryConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
