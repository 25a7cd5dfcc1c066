//! Global configuration model for the dctop dashboard.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DctopError, Result};
use crate::types::SortKey;

/// Initial table ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortConfig {
    /// Primary sort key.
    pub primary: SortKey,
    /// Secondary sort key used to break primary-key ties.
    pub secondary: SortKey,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            primary: SortKey::State,
            secondary: SortKey::Name,
        }
    }
}

/// Root configuration for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DctopConfig {
    /// File that receives tracing output while the TUI owns the terminal.
    pub log_file: PathBuf,
    /// Table ordering applied at startup.
    pub sort: SortConfig,
    /// Number of synthetic containers the sample runtime seeds in demo mode.
    pub demo_containers: usize,
}

impl Default for DctopConfig {
    fn default() -> Self {
        Self {
            log_file: crate::constants::default_log_file(),
            sort: SortConfig::default(),
            demo_containers: 8,
        }
    }
}

impl DctopConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DctopError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sort_is_state_then_name() {
        let config = DctopConfig::default();
        assert_eq!(config.sort.primary, SortKey::State);
        assert_eq!(config.sort.secondary, SortKey::Name);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = DctopConfig::load_or_default(Path::new("/nonexistent/dctop.json"))
            .expect("should fall back");
        assert_eq!(config.demo_containers, 8);
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let config = DctopConfig {
            demo_containers: 3,
            ..DctopConfig::default()
        };
        std::fs::write(&path, serde_json::to_string(&config).expect("serialize"))
            .expect("write");

        let loaded = DctopConfig::load(&path).expect("load");
        assert_eq!(loaded.demo_containers, 3);
    }
}
