use crate::error::{BridgeError, Result};
use std::fs;
use std::path::Path;

/// Outcome of ensuring a directory exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    Existing,
}

/// Create `path` (and parents) unless it already exists
pub fn ensure_dir(path: &Path) -> Result<DirStatus> {
    if path.is_dir() {
        return Ok(DirStatus::Existing);
    }

    fs::create_dir_all(path).map_err(|source| BridgeError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(DirStatus::Created)
}

/// Ensure every directory exists, stopping at the first failure
pub fn prepare_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<DirStatus>> {
    dirs.iter().map(|dir| ensure_dir(dir.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("llm_model/lmstudio/ollama_bridge");

        assert_eq!(ensure_dir(&nested).unwrap(), DirStatus::Created);
        assert!(nested.is_dir());
        assert_eq!(ensure_dir(&nested).unwrap(), DirStatus::Existing);
    }

    #[test]
    fn test_prepare_dirs_outermost_first() {
        let temp_dir = TempDir::new().unwrap();
        let public = temp_dir.path().join("public");
        let lmstudio = public.join("lmstudio");
        let bridge = lmstudio.join("ollama_bridge");

        let statuses = prepare_dirs(&[&public, &lmstudio, &bridge]).unwrap();
        // each level reports its own status
        assert_eq!(
            statuses,
            vec![DirStatus::Created, DirStatus::Created, DirStatus::Created]
        );

        let statuses = prepare_dirs(&[&public, &lmstudio, &bridge]).unwrap();
        assert!(statuses.iter().all(|s| *s == DirStatus::Existing));
    }

    #[test]
    fn test_file_in_the_way_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("public");
        fs::write(&blocker, "not a dir").unwrap();

        let err = ensure_dir(&blocker.join("lmstudio")).unwrap_err();
        assert!(matches!(err, BridgeError::CreateDir { .. }));
        assert!(!err.is_recoverable());
    }
}
