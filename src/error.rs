use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Config error: {0}\n\nTroubleshooting:\n- Check config file: ~/.config/ollm-bridge/config.toml\n- Option names are manifestDir, blobDir, publicModelsDir, bridgeDir\n- Run with RUST_LOG=debug for more details")]
    Config(String),

    #[error("Failed to create directory {}: {source}\n\nTroubleshooting:\n- Check write permissions on the parent directory\n- Verify publicModelsDir / bridgeDir in config", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Failed to read {}: {reason}", path.display())]
    ConfigBlob { path: PathBuf, reason: String },

    #[error("Failed to link {} -> {}: {source}", link.display(), target.display())]
    Link {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    /// Whether this error only affects a single manifest and the run can continue
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Manifest { .. } | Self::ConfigBlob { .. } | Self::Link { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
