//! Configuration module for ollm-bridge
//!
//! Loads config from `$XDG_CONFIG_HOME/ollm-bridge/config.toml` or
//! `~/.config/ollm-bridge/config.toml`. Falls back to defaults derived from
//! `OLLAMA_MODELS` and the home directory if the file doesn't exist.
//! Partial configs are merged with defaults using serde's default attributes.
//!
//! # Example
//!
//! ```no_run
//! use ollm_bridge::config::Config;
//!
//! let config = Config::load().expect("Failed to load config");
//! println!("Manifests: {}", config.manifest_dir.display());
//! println!("Bridge: {}", config.bridge_dir().display());
//! ```

pub mod schema;

pub use schema::Config;

use crate::error::{BridgeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from the default location, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        let config = toml::from_str(&content).map_err(|e| {
            BridgeError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.resolved())
            .map_err(|e| BridgeError::Config(format!("Failed to serialize config: {e}")))
    }
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config)
    } else {
        dirs::config_dir()
            .ok_or_else(|| BridgeError::Config("Cannot determine config directory".to_string()))?
    };

    Ok(config_dir.join("ollm-bridge").join("config.toml"))
}
