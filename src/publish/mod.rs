//! The publishing engine: mirror private resources into a public root.
//!
//! A [`PublishingTarget`] owns the publishing layout
//! (`<root>/Static/<package>/...` and `<root>/Persistent/<hash>[.<ext>]`)
//! and three injected collaborators: the [`Mirror`] primitive, a
//! [`SourceLocator`] for persistent resources and a [`RequestSource`] for
//! base-URI detection. Configuration is fixed at construction.

pub mod base_uri;
pub mod mirror;
pub mod static_tree;

pub use base_uri::{ConfiguredRequest, RequestSource};
pub use mirror::{FsMirror, Mirror, MirrorMode};
pub use static_tree::{StaticRoute, scan_static_tree};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};

use crate::config::PublishConfig;
use crate::resource::{Resource, ResourceStore, SourceLocator};

use base_uri::{detect_base_uri, encode_segment, with_trailing_slash};

/// Name of the static-tree subdirectory under the publishing root.
const STATIC_DIR: &str = "Static";
/// Name of the persistent-resource subdirectory under the publishing root.
const PERSISTENT_DIR: &str = "Persistent";

/// The publishing engine instance.
pub struct PublishingTarget {
    root: PathBuf,
    web_root: PathBuf,
    configured_base_uri: Option<String>,
    resolved_base_uri: OnceLock<String>,
    mode: MirrorMode,
    exclude: Vec<String>,
    mirror: Box<dyn Mirror>,
    locator: Option<Box<dyn SourceLocator>>,
    request: Box<dyn RequestSource>,
}

impl PublishingTarget {
    /// Engine wired with production collaborators from the loaded config.
    pub fn new(config: &PublishConfig) -> Self {
        Self::with_layout(
            config.publish.root.clone(),
            config.web.root.clone(),
            config.publish.mirror_mode,
        )
        .with_base_uri(config.publish.base_uri.clone())
        .with_excluded_extensions(config.publish.exclude.clone())
        .with_locator(Box::new(ResourceStore::new(config.store.root.clone())))
        .with_request_source(Box::new(ConfiguredRequest(config.web.request_uri())))
    }

    /// Bare engine: layout and mode only, filesystem mirror, no source
    /// locator (every persistent resource reports as missing) and no
    /// active request.
    pub fn with_layout(root: PathBuf, web_root: PathBuf, mode: MirrorMode) -> Self {
        Self {
            root,
            web_root,
            configured_base_uri: None,
            resolved_base_uri: OnceLock::new(),
            mode,
            exclude: vec!["php".to_owned()],
            mirror: Box::new(FsMirror::new(mode)),
            locator: None,
            request: Box::new(ConfiguredRequest(None)),
        }
    }

    /// Replace the mirror collaborator.
    pub fn with_mirror(mut self, mirror: Box<dyn Mirror>) -> Self {
        self.mirror = mirror;
        self
    }

    /// Replace the persistent-resource source locator.
    pub fn with_locator(mut self, locator: Box<dyn SourceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Replace the active-request accessor.
    pub fn with_request_source(mut self, request: Box<dyn RequestSource>) -> Self {
        self.request = request;
        self
    }

    /// Set the statically configured base URI (used verbatim, trailing
    /// slash ensured at resolution).
    pub fn with_base_uri(mut self, base_uri: Option<String>) -> Self {
        self.configured_base_uri = base_uri.filter(|s| !s.is_empty());
        self
    }

    /// Set the extensions excluded from static publishing.
    pub fn with_excluded_extensions(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/Static`
    pub fn static_dir(&self) -> PathBuf {
        self.root.join(STATIC_DIR)
    }

    /// `<root>/Persistent`
    pub fn persistent_dir(&self) -> PathBuf {
        self.root.join(PERSISTENT_DIR)
    }

    /// Idempotent directory setup: create the publishing root and the
    /// persistent subdirectory if absent.
    pub fn initialize(&self) -> Result<()> {
        for dir in [self.root.clone(), self.persistent_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Base URIs
    // ------------------------------------------------------------------

    /// Externally visible base URI for published content, memoized for the
    /// lifetime of the engine instance.
    ///
    /// A configured base URI wins; otherwise the value is detected once
    /// from the currently active inbound request. Later calls reuse the
    /// cached value even if the active request changes.
    pub fn resolve_base_uri(&self) -> Result<&str> {
        if let Some(uri) = self.resolved_base_uri.get() {
            return Ok(uri);
        }

        let uri = match &self.configured_base_uri {
            Some(base) => with_trailing_slash(base),
            None => {
                let request = self.request.current_request_uri().context(
                    "no base URI configured and no active request to detect one from",
                )?;
                detect_base_uri(&request, &self.root, &self.web_root)?
            }
        };

        Ok(self.resolved_base_uri.get_or_init(|| uri))
    }

    /// Base URI static packages are reachable under: `<base>Static/`.
    pub fn static_resources_base_uri(&self) -> Result<String> {
        Ok(format!("{}{STATIC_DIR}/", self.resolve_base_uri()?))
    }

    // ------------------------------------------------------------------
    // Persistent resources
    // ------------------------------------------------------------------

    /// Publish a content-addressed resource under `Persistent/`.
    ///
    /// Returns `Ok(None)` when the source locator reports no bytes for the
    /// resource. When the hash-named target already exists, mirroring is
    /// skipped entirely: the path encodes content identity, so existence is
    /// the correctness signal.
    pub fn publish_persistent_resource(&self, resource: &Resource) -> Result<Option<String>> {
        let target = self.persistent_dir().join(resource.publish_name());

        if !target.exists() {
            let Some(source) = self
                .locator
                .as_ref()
                .and_then(|locator| locator.locate(resource))
            else {
                return Ok(None);
            };
            self.mirror.mirror(&source, &target, false)?;
        }

        let mut uri = format!(
            "{}{PERSISTENT_DIR}/{}",
            self.resolve_base_uri()?,
            resource.pointer()
        );
        if let Some(filename) = resource.filename() {
            uri.push('/');
            uri.push_str(&encode_segment(filename));
        }
        Ok(Some(uri))
    }

    /// Public URI of a persistent resource, publishing it on demand.
    pub fn persistent_resource_uri(&self, resource: &Resource) -> Result<Option<String>> {
        self.publish_persistent_resource(resource)
    }

    /// Delete exactly the one published file matching the resource.
    ///
    /// Idempotent: an already-absent file is success. Deletion is by exact
    /// filename match only, so hash-prefix neighbours are never touched.
    pub fn unpublish_persistent_resource(&self, resource: &Resource) -> Result<bool> {
        let target = self.persistent_dir().join(resource.publish_name());
        match fs::remove_file(&target) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => {
                Err(e).with_context(|| format!("failed to unpublish {}", target.display()))
            }
        }
    }
}
