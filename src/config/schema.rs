use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Staging directory LM Studio scans, relative to `publicModelsDir`
pub const LMSTUDIO_SUBDIR: &str = "lmstudio";
/// Bridge directory name inside the LM Studio staging directory
pub const BRIDGE_SUBDIR: &str = "ollama_bridge";

/// Main configuration structure
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root of the Ollama manifest tree (`.../manifests/registry.ollama.ai`)
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
    /// Flat directory of `sha256-<hex>` blobs
    #[serde(default = "default_blob_dir")]
    pub blob_dir: PathBuf,
    #[serde(default = "default_public_models_dir")]
    pub public_models_dir: PathBuf,
    /// Derived from `public_models_dir` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_dir: Option<PathBuf>,
    /// Copy the blob when neither a symlink nor a hard link can be created
    #[serde(default)]
    pub allow_copy_fallback: bool,
    /// Remove bridge entries not produced by the current run
    #[serde(default)]
    pub prune: bool,
}

impl Config {
    /// Build a config around an Ollama models root (the directory holding
    /// `manifests/` and `blobs/`)
    #[must_use]
    pub fn from_models_root(models_root: &Path, public_models_dir: PathBuf) -> Self {
        Self {
            manifest_dir: manifest_dir_in(models_root),
            blob_dir: models_root.join("blobs"),
            public_models_dir,
            bridge_dir: None,
            allow_copy_fallback: false,
            prune: false,
        }
    }

    /// LM Studio staging directory between the public root and the bridge
    #[must_use]
    pub fn lmstudio_dir(&self) -> PathBuf {
        self.public_models_dir.join(LMSTUDIO_SUBDIR)
    }

    /// Directory holding one subdirectory of links per model
    #[must_use]
    pub fn bridge_dir(&self) -> PathBuf {
        self.bridge_dir
            .clone()
            .unwrap_or_else(|| self.lmstudio_dir().join(BRIDGE_SUBDIR))
    }

    /// Top-level directories that must exist before linking, outermost first
    #[must_use]
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.public_models_dir.clone(),
            self.lmstudio_dir(),
            self.bridge_dir(),
        ]
    }

    /// Copy with every derived path filled in, for display
    #[must_use]
    pub fn resolved(&self) -> Self {
        Self {
            bridge_dir: Some(self.bridge_dir()),
            ..self.clone()
        }
    }
}

fn manifest_dir_in(models_root: &Path) -> PathBuf {
    models_root.join("manifests").join("registry.ollama.ai")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Ollama models root, honoring `OLLAMA_MODELS` like Ollama itself does
pub fn ollama_models_root() -> PathBuf {
    match std::env::var_os("OLLAMA_MODELS") {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => home_dir().join(".ollama").join("models"),
    }
}

// Default value functions
fn default_manifest_dir() -> PathBuf {
    manifest_dir_in(&ollama_models_root())
}
fn default_blob_dir() -> PathBuf {
    ollama_models_root().join("blobs")
}
fn default_public_models_dir() -> PathBuf {
    home_dir().join("llm_model")
}

impl Default for Config {
    fn default() -> Self {
        Self::from_models_root(&ollama_models_root(), default_public_models_dir())
    }
}
