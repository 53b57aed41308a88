//! Base URI detection for published resources.
//!
//! The externally visible base URI is either configured explicitly or
//! derived once from the currently active inbound request: its origin
//! (scheme + host + port, request path stripped to the site root) plus the
//! publishing root's location under the web document root.

use std::path::Path;

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Characters escaped in URI path segments: everything but unreserved.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode one URI path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Supplies the URI of the currently active inbound request, if any.
///
/// The engine consumes this interface; the CLI feeds it a configured value
/// and tests substitute counting fakes.
pub trait RequestSource {
    fn current_request_uri(&self) -> Option<Url>;
}

/// Request source backed by a value fixed at construction time.
#[derive(Debug, Default)]
pub struct ConfiguredRequest(pub Option<Url>);

impl RequestSource for ConfiguredRequest {
    fn current_request_uri(&self) -> Option<Url> {
        self.0.clone()
    }
}

/// Derive the public base URI from a request origin and the publishing
/// root's path relative to the web document root.
///
/// `http://host/some/page` with root `/web/_resources` under `/web` yields
/// `http://host/_resources/`. The request's own path is discarded: published
/// resources hang off the site root, not off whatever page was requested.
pub fn detect_base_uri(request: &Url, publishing_root: &Path, web_root: &Path) -> Result<String> {
    let host = request
        .host_str()
        .with_context(|| format!("request URI {request} has no host"))?;

    let relative = publishing_root.strip_prefix(web_root).with_context(|| {
        format!(
            "publishing root {} is not inside web root {}",
            publishing_root.display(),
            web_root.display()
        )
    })?;

    let mut uri = format!("{}://{host}", request.scheme());
    if let Some(port) = request.port() {
        uri.push(':');
        uri.push_str(&port.to_string());
    }
    uri.push('/');
    for component in relative.components() {
        uri.push_str(&encode_segment(&component.as_os_str().to_string_lossy()));
        uri.push('/');
    }

    Ok(uri)
}

/// Ensure a configured base URI carries the trailing slash the URI grammar
/// expects (`<base>Persistent/<hash>`).
pub fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_owned()
    } else {
        format!("{base}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_strips_request_path() {
        let request = Url::parse("http://www.sarkosh.dk/cdcollection/albums").unwrap();
        let base = detect_base_uri(
            &request,
            &PathBuf::from("/srv/web/_resources"),
            &PathBuf::from("/srv/web"),
        )
        .unwrap();

        assert_eq!(base, "http://www.sarkosh.dk/_resources/");
    }

    #[test]
    fn test_detect_keeps_explicit_port() {
        let request = Url::parse("https://localhost:8443/admin").unwrap();
        let base = detect_base_uri(
            &request,
            &PathBuf::from("/srv/web/_resources"),
            &PathBuf::from("/srv/web"),
        )
        .unwrap();

        assert_eq!(base, "https://localhost:8443/_resources/");
    }

    #[test]
    fn test_detect_nested_publishing_root() {
        let request = Url::parse("http://example.com/").unwrap();
        let base = detect_base_uri(
            &request,
            &PathBuf::from("/srv/web/assets/published"),
            &PathBuf::from("/srv/web"),
        )
        .unwrap();

        assert_eq!(base, "http://example.com/assets/published/");
    }

    #[test]
    fn test_detect_outside_web_root_is_error() {
        let request = Url::parse("http://example.com/").unwrap();
        let result = detect_base_uri(
            &request,
            &PathBuf::from("/elsewhere/_resources"),
            &PathBuf::from("/srv/web"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("source.jpg"), "source.jpg");
        assert_eq!(encode_segment("my photo.jpg"), "my%20photo.jpg");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn test_with_trailing_slash() {
        assert_eq!(with_trailing_slash("http://host/dir"), "http://host/dir/");
        assert_eq!(with_trailing_slash("http://host/dir/"), "http://host/dir/");
    }
}
