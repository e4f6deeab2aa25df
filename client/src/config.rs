//! Client configuration loaded from `client.toml`

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::{Coords, DEFAULT_MODEL_LOAD_ATTEMPTS};

/// Where Mr Crime stands unless configured otherwise
pub const DEFAULT_NPC_COORDS: Coords = Coords::new(123.87, -1082.22, 29.19);
pub const DEFAULT_NPC_HEADING: f32 = 90.0;
pub const DEFAULT_NPC_MODEL: &str = "s_m_y_dealer_01";

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

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub model: String,
    pub coords: Coords,
    pub heading: f32,
    /// Seconds between startup and the first spawn attempt
    pub spawn_delay_secs: f32,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_NPC_MODEL.to_string(),
            coords: DEFAULT_NPC_COORDS,
            heading: DEFAULT_NPC_HEADING,
            spawn_delay_secs: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub player_name: String,
    pub npc: NpcConfig,
    /// Frames a model may take to load before giving up
    pub model_load_attempts: u32,
    /// Seconds between position reports to the server
    pub position_interval_secs: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:2567/ws".to_string(),
            player_name: "Stranger".to_string(),
            npc: NpcConfig::default(),
            model_load_attempts: DEFAULT_MODEL_LOAD_ATTEMPTS,
            position_interval_secs: 1.0,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.npc.model, "s_m_y_dealer_01");
        assert_eq!(config.npc.spawn_delay_secs, 8.0);
        assert_eq!(config.model_load_attempts, 300);
    }

    #[test]
    fn test_partial_npc_section_keeps_defaults() {
        let config = ClientConfig::parse(
            r#"
server_url = "ws://10.0.0.2:2567/ws"

[npc]
heading = 180.0
coords = { x = 1.0, y = 2.0, z = 3.0 }
"#,
        )
        .unwrap();

        assert_eq!(config.server_url, "ws://10.0.0.2:2567/ws");
        assert_eq!(config.npc.heading, 180.0);
        assert_eq!(config.npc.coords, Coords::new(1.0, 2.0, 3.0));
        assert_eq!(config.npc.model, DEFAULT_NPC_MODEL);
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        assert!(ClientConfig::parse("model_load_attempts = \"lots\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ClientConfig::load_or_default(Path::new("/nonexistent/client.toml")).unwrap();
        assert_eq!(config.player_name, "Stranger");
    }
}
