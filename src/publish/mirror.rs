//! Mirror primitive: reproduce a source file at a target path.
//!
//! Two realization strategies, selected by [`MirrorMode`]:
//! - `copy`: byte-for-byte copy, target mtime set equal to the source's so
//!   freshness checks stay stable across re-runs
//! - `link`: symbolic link at the target pointing at the source
//!
//! The freshness skip is the caller's job; this primitive mirrors
//! unconditionally when invoked.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::utils::path::symlink_any;

/// Physical realization strategy for mirrored files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    #[default]
    Copy,
    Link,
}

/// The mirror collaborator the publishers invoke per file.
///
/// Exposed as a trait so tests can substitute a recording fake at the
/// interface boundary.
pub trait Mirror {
    /// Mirror `source` to `target`. `force_copy` overrides link mode for
    /// callers that need a physical copy regardless of configuration.
    fn mirror(&self, source: &Path, target: &Path, force_copy: bool) -> Result<()>;
}

/// Production mirror backed by real filesystem operations.
#[derive(Debug, Clone, Copy)]
pub struct FsMirror {
    mode: MirrorMode,
}

impl FsMirror {
    pub fn new(mode: MirrorMode) -> Self {
        Self { mode }
    }

    fn copy_file(source: &Path, target: &Path) -> Result<()> {
        fs::copy(source, target).with_context(|| {
            format!(
                "failed to copy {} to {}",
                source.display(),
                target.display()
            )
        })?;

        // Carry the source mtime over so the target passes freshness checks
        // until the source changes again.
        let mtime = fs::metadata(source)
            .and_then(|m| m.modified())
            .with_context(|| format!("failed to read mtime of {}", source.display()))?;
        let target_file = fs::OpenOptions::new()
            .write(true)
            .open(target)
            .with_context(|| format!("failed to reopen {}", target.display()))?;
        target_file
            .set_modified(mtime)
            .with_context(|| format!("failed to set mtime of {}", target.display()))?;

        Ok(())
    }

    fn link_file(source: &Path, target: &Path) -> Result<()> {
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_symlink() => {
                fs::remove_file(target)
                    .with_context(|| format!("failed to replace link {}", target.display()))?;
            }
            Ok(_) => bail!(
                "refusing to replace {} with a symbolic link: a regular file occupies the target",
                target.display()
            ),
            Err(_) => {}
        }
        symlink_any(source, target)
    }
}

impl Mirror for FsMirror {
    fn mirror(&self, source: &Path, target: &Path, force_copy: bool) -> Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if force_copy || self.mode == MirrorMode::Copy {
            Self::copy_file(source, target)
        } else {
            Self::link_file(source, target)
        }
    }
}
