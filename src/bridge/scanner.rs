use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect every manifest file under `root`.
///
/// Directories are excluded; symlinks count when they resolve to a file.
/// Entries within a directory come back in file-name order.
/// A missing root or unreadable subtree yields fewer results, never an error.
pub fn scan_manifests(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::warn!("Manifest directory {} does not exist", root.display());
        return Vec::new();
    }

    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}
