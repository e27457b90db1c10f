mod engine;
mod server;

pub use engine::EngineConfig;
pub use server::ServerConfig;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration, read from an optional TOML file.
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8080
/// data_dir = "/var/lib/larder"
///
/// [engine]
/// copy_conflict_retries = 1
/// busy_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LarderConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

impl LarderConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LarderConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.copy_conflict_retries, 1);
    }

    #[test]
    fn test_partial_sections() {
        let config = LarderConfig::from_toml(
            "[server]\nport = 9000\n\n[engine]\ncopy_conflict_retries = 3\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.engine.copy_conflict_retries, 3);
        assert_eq!(config.engine.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_invalid_config() {
        let result = LarderConfig::from_toml("[server]\nport = \"eighty\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
