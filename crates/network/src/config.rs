//! Network analyzer configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::NetworkResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Requested graph depths are clamped to this many hops
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    5
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl NetworkConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> NetworkResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn clamp_depth(&self, requested: usize) -> usize {
        requested.min(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clamp_depth() {
        let config = NetworkConfig::default();
        assert_eq!(config.clamp_depth(2), 2);
        assert_eq!(config.clamp_depth(50), 5);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_depth": 3 }}"#).unwrap();
        assert_eq!(NetworkConfig::from_file(file.path()).unwrap().max_depth, 3);
    }
}
