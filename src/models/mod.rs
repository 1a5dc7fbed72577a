pub mod manifest;
pub mod metadata;

pub use manifest::{Manifest, ResolvedManifest};
pub use metadata::ModelConfig;
