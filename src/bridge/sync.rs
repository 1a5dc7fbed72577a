use crate::bridge::linker::{remove_entry, LinkKind, Linker};
use crate::bridge::prepare::{prepare_dirs, DirStatus};
use crate::bridge::scanner::scan_manifests;
use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::models::manifest::{self, ResolvedManifest};
use crate::models::ModelConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a single manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Linked { link: PathBuf, kind: LinkKind },
    /// Manifest without a config blob or model layer
    Skipped,
}

/// Totals for one run over the manifest tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub manifests_found: usize,
    /// Every link written during this run
    pub linked: BTreeSet<PathBuf>,
    /// Links written twice because two manifests map to the same path
    pub replaced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Synchronizes the bridge directory with the Ollama manifest store
pub struct Bridge<'a> {
    config: &'a Config,
    linker: Linker,
}

impl<'a> Bridge<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self {
            config,
            linker: Linker::new(config.allow_copy_fallback),
        }
    }

    /// Run a full pass: prepare directories, link every manifest, optionally prune.
    ///
    /// Only directory preparation can fail the run; per-manifest errors are
    /// printed and counted in the report.
    pub fn run(&self) -> Result<RunReport> {
        self.print_directories();
        self.prepare()?;

        println!("\nExploring Manifest Directory:\n");
        let manifests = scan_manifests(&self.config.manifest_dir);
        println!("Found {} manifest files.", manifests.len());

        let mut report = RunReport {
            manifests_found: manifests.len(),
            ..RunReport::default()
        };

        // model dirs of manifests that failed this run; pruning leaves them alone
        let mut failed_dirs = BTreeSet::new();

        for path in &manifests {
            match self.process(path) {
                Ok(Outcome::Linked { link, kind }) => {
                    if kind != LinkKind::Symlink {
                        println!("Symbolic links unavailable, created {kind} instead");
                    }
                    if !report.linked.insert(link.clone()) {
                        println!("Replaced {} linked earlier in this run", link.display());
                        tracing::warn!(
                            "{} was already linked by another manifest in this run",
                            link.display()
                        );
                        report.replaced += 1;
                    }
                }
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) if e.is_recoverable() => {
                    println!("{e}");
                    tracing::debug!("Recovered error for {}: {e:?}", path.display());
                    report.failed += 1;
                    if let Some(name) = manifest::model_name(path) {
                        failed_dirs.insert(self.config.bridge_dir().join(name));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        if self.config.prune {
            report.pruned = prune_stale(&self.config.bridge_dir(), &report.linked, &failed_dirs);
        }

        self.print_summary(&report);
        Ok(report)
    }

    /// Resolve one manifest and (re)create its link
    pub fn process(&self, manifest_path: &Path) -> Result<Outcome> {
        let Some(resolved) = manifest::resolve(manifest_path, &self.config.blob_dir)? else {
            return Ok(Outcome::Skipped);
        };

        let model_config = ModelConfig::load(&resolved.config_blob)?;

        println!("\n--- Processing Model: {} ---", resolved.name);
        println!("Quant: {}", model_config.file_type);
        println!("Extension: {}", model_config.model_format);
        println!("Trained On: {}", model_config.model_type);

        self.link(&resolved, &model_config)
    }

    fn link(&self, resolved: &ResolvedManifest, model_config: &ModelConfig) -> Result<Outcome> {
        let file_name = model_config.link_file_name(&resolved.name);
        let model_dir = self.config.bridge_dir().join(&resolved.name);
        let link = model_dir.join(&file_name);

        fs::create_dir_all(&model_dir).map_err(|source| BridgeError::Link {
            link: link.clone(),
            target: resolved.model_blob.clone(),
            source,
        })?;

        println!("Creating symbolic link → {file_name}");
        let kind = self.linker.replace(&resolved.model_blob, &link)?;
        tracing::debug!(
            "Linked {} -> {} ({kind})",
            link.display(),
            resolved.model_blob.display()
        );

        Ok(Outcome::Linked { link, kind })
    }

    fn prepare(&self) -> Result<()> {
        let statuses = prepare_dirs(&self.config.required_dirs())?;

        println!();
        for (label, status) in ["Public Models", "LMStudio", "Ollama Bridge"]
            .iter()
            .zip(statuses)
        {
            match status {
                DirStatus::Created => println!("{label} Directory Created."),
                DirStatus::Existing => println!("{label} Directory Confirmed."),
            }
        }

        Ok(())
    }

    fn print_directories(&self) {
        println!("\n=== Confirming Directories ===\n");
        println!("Manifest Directory: {}", self.config.manifest_dir.display());
        println!("Blob Directory: {}", self.config.blob_dir.display());
        println!("LMStudio Directory: {}", self.config.lmstudio_dir().display());
        println!("Ollama Bridge Directory: {}", self.config.bridge_dir().display());
    }

    fn print_summary(&self, report: &RunReport) {
        println!("\n*********************");
        println!(
            "Linked {} models, skipped {} incomplete manifests, {} failed.",
            report.linked.len(),
            report.skipped,
            report.failed
        );
        if report.replaced > 0 {
            println!(
                "{} links were replaced by a later manifest with the same name.",
                report.replaced
            );
        }
        if self.config.prune {
            println!("Pruned {} stale entries.", report.pruned);
        }
        println!(
            "Add the following directory to LM Studio if not already added:\n{}",
            self.config.bridge_dir().display()
        );
    }
}

/// Remove entries under `<bridge_dir>/<model>/` not in `keep`, then empty model dirs.
///
/// Model dirs listed in `keep_dirs` are not touched at all. Failures are
/// logged and skipped. Returns the number of entries removed.
pub fn prune_stale(
    bridge_dir: &Path,
    keep: &BTreeSet<PathBuf>,
    keep_dirs: &BTreeSet<PathBuf>,
) -> usize {
    let Ok(model_dirs) = fs::read_dir(bridge_dir) else {
        tracing::warn!("Cannot read {} for pruning", bridge_dir.display());
        return 0;
    };

    let mut pruned = 0;
    for model_dir in model_dirs.flatten() {
        let model_dir = model_dir.path();
        // symlink_metadata so a linked directory is never descended into
        let is_dir = fs::symlink_metadata(&model_dir).is_ok_and(|m| m.is_dir());
        if !is_dir {
            continue;
        }
        if keep_dirs.contains(&model_dir) {
            tracing::debug!("Not pruning {}, its manifest failed", model_dir.display());
            continue;
        }

        let Ok(entries) = fs::read_dir(&model_dir) else {
            tracing::warn!("Cannot read {} for pruning", model_dir.display());
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if keep.contains(&path) {
                continue;
            }
            match remove_entry(&path) {
                Ok(()) => {
                    println!("Pruned stale entry {}", path.display());
                    pruned += 1;
                }
                Err(e) => tracing::warn!("Failed to prune {}: {e}", path.display()),
            }
        }

        let is_empty = fs::read_dir(&model_dir).is_ok_and(|mut d| d.next().is_none());
        if is_empty {
            if let Err(e) = fs::remove_dir(&model_dir) {
                tracing::warn!("Failed to remove {}: {e}", model_dir.display());
            }
        }
    }

    pruned
}
