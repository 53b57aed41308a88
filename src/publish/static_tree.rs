//! Static tree publishing: mirror a source directory under a package name.
//!
//! Scanning is pure (enumerate eligible files and their targets); the
//! publish step applies freshness checks and invokes the mirror
//! collaborator per file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::debug;
use crate::utils::mtime::{get_mtime, is_output_fresh};
use crate::utils::path::symlink_any;

use super::{MirrorMode, PublishingTarget};

/// Route of one eligible static file: source → published target.
#[derive(Debug, Clone)]
pub struct StaticRoute {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Enumerate every eligible regular file under `source_dir`, depth-first,
/// in sorted order. Files whose extension is in the excluded set are
/// skipped entirely.
pub fn scan_static_tree(
    source_dir: &Path,
    package_root: &Path,
    exclude: &[String],
) -> Vec<StaticRoute> {
    WalkDir::new(source_dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| !is_excluded(path, exclude))
        .map(|source| {
            let rel = source.strip_prefix(source_dir).unwrap_or(&source);
            StaticRoute {
                target: package_root.join(rel),
                source: source.clone(),
            }
        })
        .collect()
}

/// Check a file against the excluded-extension set (case-insensitive).
fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| exclude.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

/// True when the tree contains any file the exclusion policy would skip.
fn tree_has_excluded(source_dir: &Path, exclude: &[String]) -> bool {
    WalkDir::new(source_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| is_excluded(&entry.path(), exclude))
}

impl PublishingTarget {
    /// Publish a whole source tree under `Static/<package>/`.
    ///
    /// Returns `Ok(false)` without side effects when the source directory
    /// does not exist or is not readable. A mid-traversal I/O failure
    /// aborts the operation; already-mirrored files stay in place.
    pub fn publish_static_resources(&self, source_dir: &Path, package: &str) -> Result<bool> {
        // Canonicalize before traversal so target paths are stable no
        // matter how the caller spelled the source path.
        let source_dir = match source_dir.canonicalize() {
            Ok(dir) if dir.is_dir() => dir,
            _ => return Ok(false),
        };
        if fs::read_dir(&source_dir).is_err() {
            return Ok(false);
        }

        let package_root = self.static_dir().join(package);

        // A whole-tree symlink would also expose excluded files, so the
        // short circuit only fires for trees the policy fully admits.
        if self.mode == MirrorMode::Link
            && !tree_has_excluded(&source_dir, &self.exclude)
            && self.link_whole_tree(&source_dir, &package_root)?
        {
            debug!("static"; "linked {} -> {}", package_root.display(), source_dir.display());
            return Ok(true);
        }

        for route in scan_static_tree(&source_dir, &package_root, &self.exclude) {
            if is_output_fresh(&route.target, get_mtime(&route.source)) {
                debug!("static"; "fresh: {}", route.target.display());
                continue;
            }
            self.mirror.mirror(&route.source, &route.target, false)?;
        }

        Ok(true)
    }

    /// Link-mode short circuit: publish the whole directory as one symlink
    /// `Static/<package>` → source, skipping per-file mirroring.
    ///
    /// Returns `Ok(false)` when linking is not safe (a real directory
    /// already occupies the target); the caller then falls back to the
    /// per-file path. An existing symlink is replaced.
    fn link_whole_tree(&self, source_dir: &Path, package_root: &Path) -> Result<bool> {
        match fs::symlink_metadata(package_root) {
            Ok(meta) if meta.is_symlink() => {
                fs::remove_file(package_root).with_context(|| {
                    format!("failed to replace link {}", package_root.display())
                })?;
            }
            Ok(_) => return Ok(false),
            Err(_) => {}
        }

        if let Some(parent) = package_root.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        symlink_any(source_dir, package_root)?;
        Ok(true)
    }
}
