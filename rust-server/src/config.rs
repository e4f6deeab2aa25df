//! Server configuration loaded from `config.toml`

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::framework::DEFAULT_NOTIFY_LENGTH_MS;
use crate::framework::inventory::DEFAULT_INVENTORY_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// Reload the mission catalog when the file changes
    pub hot_reload: bool,
    pub inventory_slots: usize,
    pub notify_length_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:2567".to_string(),
            data_dir: PathBuf::from("data"),
            hot_reload: true,
            inventory_slots: DEFAULT_INVENTORY_SIZE,
            notify_length_ms: DEFAULT_NOTIFY_LENGTH_MS,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "bind_address = \"127.0.0.1:9000\"\nhot_reload = false\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert!(!config.hot_reload);
        assert_eq!(config.inventory_slots, DEFAULT_INVENTORY_SIZE);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig::load_or_default(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.notify_length_ms, DEFAULT_NOTIFY_LENGTH_MS);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "inventory_slots = \"many\"").unwrap();
        assert!(matches!(ServerConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
