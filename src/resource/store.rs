//! Private content-addressed resource store.
//!
//! Blobs live flat under the store root, named by their content pointer.
//! The store is the private side of publishing: the engine never serves
//! from here directly, it mirrors blobs into the public root on demand.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{ContentPointer, Resource};

/// Resolves a resource to its private source path.
///
/// The publishing engine consumes this interface; tests substitute fakes.
pub trait SourceLocator {
    /// Absolute source path for the resource's bytes, or `None` when the
    /// bytes are not available.
    fn locate(&self, resource: &Resource) -> Option<PathBuf>;
}

/// Filesystem-backed store keyed by content hash.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    root: PathBuf,
}

impl ResourceStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a pointer's blob lives at (whether or not it exists yet).
    pub fn blob_path(&self, pointer: &ContentPointer) -> PathBuf {
        self.root.join(pointer.as_str())
    }

    /// Import a file into the store and return its resource.
    ///
    /// The blob is stored under its content hash, so importing identical
    /// bytes twice lands on the same blob and the second copy is skipped.
    pub fn import(&self, source: &Path) -> Result<Resource> {
        let pointer = ContentPointer::from_file(source)?;

        let blob = self.blob_path(&pointer);
        if !blob.exists() {
            fs::create_dir_all(&self.root)
                .with_context(|| format!("failed to create store root {}", self.root.display()))?;
            fs::copy(source, &blob).with_context(|| {
                format!("failed to store {} as {}", source.display(), blob.display())
            })?;
        }

        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        Ok(Resource::new(pointer, filename, extension))
    }
}

impl SourceLocator for ResourceStore {
    fn locate(&self, resource: &Resource) -> Option<PathBuf> {
        let blob = self.blob_path(resource.pointer());
        blob.is_file().then_some(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ResourceStore {
        ResourceStore::new(dir.path().join("store"))
    }

    #[test]
    fn test_import_stores_blob_under_hash() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let source = dir.path().join("photo.jpg");
        fs::write(&source, "jpeg bytes").unwrap();

        let resource = store.import(&source).unwrap();

        assert_eq!(resource.filename(), Some("photo.jpg"));
        assert_eq!(resource.extension(), Some("jpg"));

        let blob = store.blob_path(resource.pointer());
        assert!(blob.is_file());
        assert_eq!(fs::read_to_string(&blob).unwrap(), "jpeg bytes");
    }

    #[test]
    fn test_import_deduplicates_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        fs::write(&first, "same content").unwrap();
        fs::write(&second, "same content").unwrap();

        let a = store.import(&first).unwrap();
        let b = store.import(&second).unwrap();

        assert_eq!(a.pointer(), b.pointer());
        assert_eq!(store.blob_path(a.pointer()), store.blob_path(b.pointer()));

        // One blob for both logical resources.
        let blobs = fs::read_dir(store.root()).unwrap().count();
        assert_eq!(blobs, 1);
    }

    #[test]
    fn test_locate_present_and_missing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let source = dir.path().join("doc.pdf");
        fs::write(&source, "pdf bytes").unwrap();
        let imported = store.import(&source).unwrap();

        assert_eq!(
            store.locate(&imported),
            Some(store.blob_path(imported.pointer()))
        );

        let absent = Resource::new(ContentPointer::from_bytes(b"never imported"), None, None);
        assert_eq!(store.locate(&absent), None);
    }

    #[test]
    fn test_import_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.import(&dir.path().join("missing.bin")).is_err());
    }
}
