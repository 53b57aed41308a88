//! Engine configuration from `repub.toml`.
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[publish]` | Publishing root, mirror mode, base URI, exclusions |
//! | `[store]`   | Private content-addressed source store             |
//! | `[web]`     | Web document root and request URI for detection    |
//!
//! The configuration is immutable after [`PublishConfig::load`]: paths are
//! normalized against the config file's directory once, validation runs
//! once, and the engine is constructed from the finished value.

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use url::Url;

use crate::publish::MirrorMode;
use crate::utils::path::normalize_path;

/// Root configuration structure representing repub.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Publishing settings
    pub publish: PublishSection,

    /// Private resource store settings
    pub store: StoreSection,

    /// Web root and request settings for base-URI detection
    pub web: WebSection,
}

/// `[publish]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSection {
    /// Publishing root the Static/ and Persistent/ trees live under
    pub root: PathBuf,

    /// How mirrored files are realized: "copy" or "link"
    pub mirror_mode: MirrorMode,

    /// Externally visible base URI, used verbatim when set
    pub base_uri: Option<String>,

    /// File extensions never published from static trees
    pub exclude: Vec<String>,
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public/_resources"),
            mirror_mode: MirrorMode::default(),
            base_uri: None,
            exclude: vec!["php".to_owned()],
        }
    }
}

/// `[store]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Root of the private content-addressed store
    pub root: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".repub/store"),
        }
    }
}

/// `[web]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebSection {
    /// Web document root the publishing root must live under for
    /// base-URI detection
    pub root: PathBuf,

    /// URI of the current inbound request, for detection without a
    /// configured base URI
    pub request_uri: Option<String>,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            request_uri: None,
        }
    }
}

impl WebSection {
    /// Parsed request URI, if one is configured.
    ///
    /// Validation guarantees the stored string parses, so a `None` here
    /// always means "not configured".
    pub fn request_uri(&self) -> Option<Url> {
        self.request_uri
            .as_deref()
            .and_then(|uri| Url::parse(uri).ok())
    }
}

impl PublishConfig {
    /// Load configuration from a `repub.toml` path.
    ///
    /// Paths are normalized against the config file's parent directory;
    /// validation failures are fatal here, not at first use.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config = Self::parse(&raw)?;

        config.config_path = normalize_path(path);
        config.root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.finalize();
        config.validate()?;

        Ok(config)
    }

    /// Parse raw TOML into an un-finalized config.
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Normalize paths to absolute form and drop empty optional strings.
    fn finalize(&mut self) {
        let root = self.root.clone();
        for path in [
            &mut self.publish.root,
            &mut self.store.root,
            &mut self.web.root,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }

        let drop_empty = |s: &mut Option<String>| {
            if s.as_deref() == Some("") {
                *s = None;
            }
        };
        drop_empty(&mut self.publish.base_uri);
        drop_empty(&mut self.web.request_uri);
    }

    /// Reject values that would only fail later, at point of use.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.publish.base_uri {
            Url::parse(base).map_err(|e| {
                ConfigError::Validation(format!("publish.base_uri `{base}` is not an absolute URL: {e}"))
            })?;
        }
        if let Some(request) = &self.web.request_uri {
            Url::parse(request).map_err(|e| {
                ConfigError::Validation(format!("web.request_uri `{request}` is not an absolute URL: {e}"))
            })?;
        }
        if self.publish.exclude.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "publish.exclude entries must be non-empty extensions".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load_from(dir: &TempDir, raw: &str) -> Result<PublishConfig> {
        let path = dir.path().join("repub.toml");
        fs::write(&path, raw).unwrap();
        PublishConfig::load(&path)
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir, "").unwrap();

        assert_eq!(config.publish.mirror_mode, MirrorMode::Copy);
        assert_eq!(config.publish.base_uri, None);
        assert_eq!(config.publish.exclude, vec!["php".to_owned()]);
        assert!(config.publish.root.ends_with("public/_resources"));
        assert!(config.store.root.ends_with(".repub/store"));
        assert!(config.web.root.ends_with("public"));
    }

    #[test]
    fn test_paths_are_absolutized_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir, "[publish]\nroot = \"out/_r\"\n").unwrap();

        assert!(config.publish.root.is_absolute());
        assert!(config.publish.root.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_parse_link_mode_and_exclusions() {
        let dir = TempDir::new().unwrap();
        let config = load_from(
            &dir,
            "[publish]\nmirror_mode = \"link\"\nexclude = [\"php\", \"phtml\"]\n",
        )
        .unwrap();

        assert_eq!(config.publish.mirror_mode, MirrorMode::Link);
        assert_eq!(
            config.publish.exclude,
            vec!["php".to_owned(), "phtml".to_owned()]
        );
    }

    #[test]
    fn test_invalid_mirror_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(load_from(&dir, "[publish]\nmirror_mode = \"hardlink\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(load_from(&dir, "[publish]\nmiror_mode = \"copy\"\n").is_err());
    }

    #[test]
    fn test_relative_base_uri_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(load_from(&dir, "[publish]\nbase_uri = \"/_resources/\"\n").is_err());
    }

    #[test]
    fn test_empty_optional_strings_count_as_unset() {
        let dir = TempDir::new().unwrap();
        let config = load_from(
            &dir,
            "[publish]\nbase_uri = \"\"\n\n[web]\nrequest_uri = \"\"\n",
        )
        .unwrap();

        assert_eq!(config.publish.base_uri, None);
        assert_eq!(config.web.request_uri(), None);
    }

    #[test]
    fn test_request_uri_parses() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir, "[web]\nrequest_uri = \"http://host:8080/page\"\n").unwrap();

        let uri = config.web.request_uri().unwrap();
        assert_eq!(uri.host_str(), Some("host"));
        assert_eq!(uri.port(), Some(8080));
    }
}
