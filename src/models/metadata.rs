use crate::error::{BridgeError, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

/// Descriptive metadata read from a model's config blob
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// Quantization label, e.g. `Q4_0`
    #[serde(default = "default_unknown", deserialize_with = "string_or_unknown")]
    pub file_type: String,
    /// File extension, e.g. `gguf`
    #[serde(default = "default_format", deserialize_with = "string_or_format")]
    pub model_format: String,
    /// Base architecture the model was trained on, e.g. `llama`
    #[serde(default = "default_unknown", deserialize_with = "string_or_unknown")]
    pub model_type: String,
}

fn default_unknown() -> String {
    "unknown".to_string()
}
fn default_format() -> String {
    "bin".to_string()
}

// Non-string values fall back to the default rather than failing the blob
fn string_or<'de, D>(
    deserializer: D,
    fallback: fn() -> String,
) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map_or_else(fallback, str::to_string))
}

fn string_or_unknown<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, default_unknown)
}

fn string_or_format<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, default_format)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            file_type: default_unknown(),
            model_format: default_format(),
            model_type: default_unknown(),
        }
    }
}

impl ModelConfig {
    /// Read and decode a config blob
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BridgeError::ConfigBlob {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| BridgeError::ConfigBlob {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Link file name LM Studio will display: `<name>-<type>-<quant>.<format>`
    #[must_use]
    pub fn link_file_name(&self, model_name: &str) -> String {
        format!(
            "{model_name}-{}-{}.{}",
            self.model_type, self.file_type, self.model_format
        )
    }
}
