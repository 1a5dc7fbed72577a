//! Link creation with a fixed fallback order.
//!
//! A native symbolic link is always tried first. When the platform refuses
//! it for privilege or capability reasons (Windows without developer mode,
//! filesystems without symlink support), a hard link is tried next. Copying
//! the blob is the last resort and only happens when explicitly enabled.

use crate::error::{BridgeError, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// How a bridge entry ended up referencing its blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Symbolic link (default, works across filesystems)
    Symlink,
    /// Hard link (same filesystem only)
    Hardlink,
    /// Full copy of the blob
    Copy,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => write!(f, "symbolic link"),
            Self::Hardlink => write!(f, "hard link"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

/// Creates bridge entries, replacing whatever is already at the link path
#[derive(Debug, Clone, Copy, Default)]
pub struct Linker {
    allow_copy: bool,
}

impl Linker {
    #[must_use]
    pub const fn new(allow_copy: bool) -> Self {
        Self { allow_copy }
    }

    /// Remove any entry at `link`, then point a fresh link at `target`
    pub fn replace(&self, target: &Path, link: &Path) -> Result<LinkKind> {
        remove_entry(link).map_err(|source| link_error(target, link, source))?;
        self.create(target, link)
    }

    /// Create a link at `link` pointing to `target`
    pub fn create(&self, target: &Path, link: &Path) -> Result<LinkKind> {
        let symlink_err = match symlink_file(target, link) {
            Ok(()) => return Ok(LinkKind::Symlink),
            Err(e) if is_privilege_error(&e) => e,
            Err(e) => return Err(link_error(target, link, e)),
        };
        tracing::debug!(
            "Symlink refused for {} ({symlink_err}), trying hard link",
            link.display()
        );

        let hardlink_err = match fs::hard_link(target, link) {
            Ok(()) => return Ok(LinkKind::Hardlink),
            Err(e) => e,
        };

        if !self.allow_copy {
            return Err(link_error(target, link, hardlink_err));
        }
        tracing::debug!(
            "Hard link failed for {} ({hardlink_err}), copying",
            link.display()
        );

        fs::copy(target, link)
            .map(|_| LinkKind::Copy)
            .map_err(|e| link_error(target, link, e))
    }
}

fn link_error(target: &Path, link: &Path, source: io::Error) -> BridgeError {
    BridgeError::Link {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    }
}

/// Remove whatever sits at `path` (file, symlink, broken symlink or directory)
pub fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        return fs::remove_dir_all(path);
    }

    // Windows directory symlinks must be removed as directories
    #[cfg(windows)]
    {
        if meta.file_type().is_symlink() {
            return fs::remove_file(path).or_else(|_| fs::remove_dir(path));
        }
    }

    fs::remove_file(path)
}

/// Errors meaning "symlinks are not available here", not "this link is bad"
fn is_privilege_error(err: &io::Error) -> bool {
    // ERROR_PRIVILEGE_NOT_HELD
    #[cfg(windows)]
    {
        if err.raw_os_error() == Some(1314) {
            return true;
        }
    }

    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::Unsupported
    )
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_file(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
