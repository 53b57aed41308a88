//! Path normalization and symlink helpers.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `symlink_any` - cross-platform symlink creation
//! - `is_symlink` - link detection without following the link

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// use crate::utils::path::normalize_path;
/// let abs = normalize_path(Path::new("./public/_resources"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Create a symbolic link at `target` pointing at `source`.
///
/// Platforms without symlink support report an error instead of silently
/// degrading to a copy.
#[cfg(unix)]
pub fn symlink_any(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target).with_context(|| {
        format!(
            "failed to link {} -> {}",
            target.display(),
            source.display()
        )
    })
}

/// Create a symbolic link at `target` pointing at `source`.
///
/// The link flavor follows the source's kind (file vs directory).
#[cfg(windows)]
pub fn symlink_any(source: &Path, target: &Path) -> Result<()> {
    let link = if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    };
    link.with_context(|| {
        format!(
            "failed to link {} -> {}",
            target.display(),
            source.display()
        )
    })
}

/// Create a symbolic link at `target` pointing at `source`.
#[cfg(not(any(unix, windows)))]
pub fn symlink_any(source: &Path, target: &Path) -> Result<()> {
    let _ = (source, target);
    anyhow::bail!("symbolic links are not supported on this platform")
}

/// Check whether `path` is a symbolic link (the link itself, not its target).
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_symlink())
}
