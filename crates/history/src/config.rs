//! History engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::HistoryResult;

/// Paging limits and accountability scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Page size when the request does not give one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Requested page sizes are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Accountability points per recorded action
    #[serde(default = "default_accountability_per_action")]
    pub accountability_per_action: u32,

    /// Upper bound of the accountability score
    #[serde(default = "default_accountability_cap")]
    pub accountability_cap: u32,
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    500
}

fn default_accountability_per_action() -> u32 {
    10
}

fn default_accountability_cap() -> u32 {
    100
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            accountability_per_action: default_accountability_per_action(),
            accountability_cap: default_accountability_cap(),
        }
    }
}

impl HistoryConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> HistoryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Linear score, capped
    pub fn accountability(&self, actions: usize) -> u32 {
        let actions = u32::try_from(actions).unwrap_or(u32::MAX);
        actions
            .saturating_mul(self.accountability_per_action)
            .min(self.accountability_cap)
    }

    /// Resolve a requested page size against the configured limits
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 500);
        assert_eq!(config.accountability_per_action, 10);
        assert_eq!(config.accountability_cap, 100);
    }

    #[test]
    fn test_accountability_is_capped() {
        let config = HistoryConfig::default();
        assert_eq!(config.accountability(0), 0);
        assert_eq!(config.accountability(3), 30);
        assert_eq!(config.accountability(10), 100);
        assert_eq!(config.accountability(25), 100);
    }

    #[test]
    fn test_page_size_clamped() {
        let config = HistoryConfig::default();
        assert_eq!(config.page_size(None), 50);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(10_000)), 500);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_page_size": 20 }}"#).unwrap();

        let config = HistoryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 500);
    }
}
