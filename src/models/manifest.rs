use crate::error::{BridgeError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of the `mediaType` carried by the layer holding model weights
const MODEL_MEDIA_SUFFIX: &str = "model";

/// Reference to a blob (`config` entry or one of `layers`)
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(default, deserialize_with = "string_or_none")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub digest: Option<String>,
}

impl Descriptor {
    fn is_model_layer(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|m| m.ends_with(MODEL_MEDIA_SUFFIX))
    }

    // Non-objects carry no reference
    fn from_value(value: Value) -> Option<Self> {
        value
            .is_object()
            .then(|| serde_json::from_value(value).ok())
            .flatten()
    }
}

/// Ollama image manifest, reduced to the fields the bridge needs.
///
/// Fields of an unexpected JSON type count as absent, so such manifests
/// are skipped like partial ones instead of failing to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "descriptor_or_none")]
    pub config: Option<Descriptor>,
    #[serde(default, deserialize_with = "descriptors_or_empty")]
    pub layers: Vec<Descriptor>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

fn descriptor_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Descriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Descriptor::from_value(Value::deserialize(deserializer)?))
}

fn descriptors_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Descriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let layers = match Value::deserialize(deserializer)? {
        Value::Array(layers) => layers,
        _ => return Ok(Vec::new()),
    };

    Ok(layers
        .into_iter()
        .map(|layer| Descriptor::from_value(layer).unwrap_or_default())
        .collect())
}

/// A manifest whose config blob and model blob are both known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    /// Name of the directory holding the manifest (usually the tag)
    pub name: String,
    pub config_blob: PathBuf,
    pub model_blob: PathBuf,
}

impl Manifest {
    /// Read and decode a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BridgeError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| BridgeError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Digest of the config blob, if the manifest names one
    #[must_use]
    pub fn config_digest(&self) -> Option<&str> {
        self.config
            .as_ref()
            .and_then(|c| c.digest.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Digest of the model layer; the last matching layer wins
    #[must_use]
    pub fn model_digest(&self) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.is_model_layer())
            .and_then(|layer| layer.digest.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Locate both blobs under `blob_dir`. `None` for partial manifests.
    #[must_use]
    pub fn blobs(&self, blob_dir: &Path) -> Option<(PathBuf, PathBuf)> {
        let config = blob_path(blob_dir, self.config_digest()?);
        let model = blob_path(blob_dir, self.model_digest()?);
        Some((config, model))
    }
}

/// Blob file name for a digest (`sha256:abc` -> `sha256-abc`)
#[must_use]
pub fn blob_file_name(digest: &str) -> String {
    digest.replace("sha256:", "sha256-")
}

/// Path of the blob for a digest inside the blob store
#[must_use]
pub fn blob_path(blob_dir: &Path, digest: &str) -> PathBuf {
    blob_dir.join(blob_file_name(digest))
}

/// Model name for a manifest: its parent directory's name
#[must_use]
pub fn model_name(manifest_path: &Path) -> Option<String> {
    manifest_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

/// Load a manifest and resolve its blobs.
///
/// Returns `Ok(None)` for manifests without a config digest or model layer;
/// those are expected (non-model artifacts) and not an error.
pub fn resolve(manifest_path: &Path, blob_dir: &Path) -> Result<Option<ResolvedManifest>> {
    let manifest = Manifest::load(manifest_path)?;

    let Some((config_blob, model_blob)) = manifest.blobs(blob_dir) else {
        tracing::debug!("Skipping incomplete manifest {}", manifest_path.display());
        return Ok(None);
    };

    let Some(name) = model_name(manifest_path) else {
        tracing::debug!("No model name for {}", manifest_path.display());
        return Ok(None);
    };

    Ok(Some(ResolvedManifest {
        name,
        config_blob,
        model_blob,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(json: &str) -> Manifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_blob_file_name() {
        assert_eq!(blob_file_name("sha256:abc123"), "sha256-abc123");
        assert_eq!(blob_file_name("sha256-abc123"), "sha256-abc123");
    }

    #[test]
    fn test_model_layer_suffix_match() {
        let manifest = parse(
            r#"{
                "config": {"digest": "sha256:aaa"},
                "layers": [
                    {"mediaType": "application/vnd.ollama.image.template", "digest": "sha256:t"},
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"},
                    {"mediaType": "application/vnd.ollama.image.license", "digest": "sha256:l"}
                ]
            }"#,
        );
        assert_eq!(manifest.config_digest(), Some("sha256:aaa"));
        assert_eq!(manifest.model_digest(), Some("sha256:bbb"));
    }

    #[test]
    fn test_last_model_layer_wins() {
        let manifest = parse(
            r#"{
                "config": {"digest": "sha256:aaa"},
                "layers": [
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:first"},
                    {"mediaType": "application/vnd.ollama.image.params", "digest": "sha256:p"},
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:second"}
                ]
            }"#,
        );
        assert_eq!(manifest.model_digest(), Some("sha256:second"));
    }

    #[test]
    fn test_suffix_is_case_sensitive_and_exact() {
        let manifest = parse(
            r#"{
                "config": {"digest": "sha256:aaa"},
                "layers": [
                    {"mediaType": "application/vnd.ollama.image.MODEL", "digest": "sha256:upper"},
                    {"mediaType": "application/vnd.ollama.image.models", "digest": "sha256:plural"},
                    {"mediaType": "application/vnd.ollama.image.projector", "digest": "sha256:proj"}
                ]
            }"#,
        );
        assert_eq!(manifest.model_digest(), None);
    }

    #[test]
    fn test_missing_fields_are_partial() {
        assert!(parse("{}").blobs(Path::new("/blobs")).is_none());

        let no_layers = parse(r#"{"config": {"digest": "sha256:aaa"}}"#);
        assert!(no_layers.blobs(Path::new("/blobs")).is_none());

        let no_config = parse(
            r#"{"layers": [{"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"}]}"#,
        );
        assert!(no_config.blobs(Path::new("/blobs")).is_none());

        let config_without_digest = parse(
            r#"{"config": {"mediaType": "x"},
                "layers": [{"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"}]}"#,
        );
        assert!(config_without_digest.blobs(Path::new("/blobs")).is_none());
    }

    #[test]
    fn test_blobs_joined_with_blob_dir() {
        let manifest = parse(
            r#"{
                "schemaVersion": 2,
                "config": {"mediaType": "application/vnd.docker.container.image.v1+json", "digest": "sha256:aaa", "size": 485},
                "layers": [{"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb", "size": 1}]
            }"#,
        );
        let (config, model) = manifest.blobs(Path::new("/blobs")).unwrap();
        assert_eq!(config, PathBuf::from("/blobs/sha256-aaa"));
        assert_eq!(model, PathBuf::from("/blobs/sha256-bbb"));
    }

    #[test]
    fn test_wrongly_typed_fields_are_absent() {
        let manifest = parse(
            r#"{
                "config": {"digest": 5},
                "layers": [{"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"}]
            }"#,
        );
        assert_eq!(manifest.config_digest(), None);
        assert!(manifest.blobs(Path::new("/blobs")).is_none());

        let manifest = parse(r#"{"config": "sha256:aaa", "layers": {"digest": "sha256:bbb"}}"#);
        assert!(manifest.config.is_none());
        assert!(manifest.layers.is_empty());
    }

    #[test]
    fn test_odd_layer_does_not_hide_model_layer() {
        let manifest = parse(
            r#"{
                "config": {"digest": "sha256:aaa"},
                "layers": [
                    {"mediaType": 7, "digest": "sha256:odd"},
                    "not-a-layer",
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"},
                    {"mediaType": "application/vnd.ollama.image.model", "digest": ["sha256:x"]}
                ]
            }"#,
        );
        assert_eq!(manifest.layers.len(), 4);
        // the last matching layer has no usable digest
        assert_eq!(manifest.model_digest(), None);

        let manifest = parse(
            r#"{
                "config": {"digest": "sha256:aaa"},
                "layers": [
                    {"mediaType": 7, "digest": "sha256:odd"},
                    {"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"}
                ]
            }"#,
        );
        assert_eq!(manifest.model_digest(), Some("sha256:bbb"));
    }

    #[test]
    fn test_model_name_is_parent_dir() {
        let path = Path::new("/m/registry.ollama.ai/library/foo/latest");
        assert_eq!(model_name(path).as_deref(), Some("foo"));
    }

    #[test]
    fn test_resolve_reports_corrupt_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latest");
        fs::write(&path, "not json {").unwrap();

        let err = resolve(&path, temp_dir.path()).unwrap_err();
        assert!(matches!(err, BridgeError::Manifest { .. }));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("latest"));
    }

    #[test]
    fn test_resolve_complete_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("library").join("foo");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("latest");
        fs::write(
            &path,
            r#"{"config": {"digest": "sha256:aaa"},
                "layers": [{"mediaType": "application/vnd.ollama.image.model", "digest": "sha256:bbb"}]}"#,
        )
        .unwrap();

        let resolved = resolve(&path, Path::new("/blobs")).unwrap().unwrap();
        assert_eq!(resolved.name, "foo");
        assert_eq!(resolved.config_blob, PathBuf::from("/blobs/sha256-aaa"));
        assert_eq!(resolved.model_blob, PathBuf::from("/blobs/sha256-bbb"));
    }

    #[test]
    fn test_resolve_partial_manifest_is_silent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latest");
        fs::write(&path, r#"{"config": {"digest": "sha256:aaa"}, "layers": []}"#).unwrap();

        assert!(resolve(&path, temp_dir.path()).unwrap().is_none());
    }
}
