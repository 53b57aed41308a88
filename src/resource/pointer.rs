//! Content pointers: hash identity for resource bytes.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

/// A content pointer: the lowercase hex blake3 hash of a resource's bytes.
///
/// Identity and equality are by hash value alone. Two resources with
/// identical bytes share one pointer and therefore one published file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentPointer(String);

/// Errors when parsing an externally supplied pointer string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointerError {
    #[error("content pointer is empty")]
    Empty,

    #[error("content pointer contains non-hex character `{0}`")]
    InvalidChar(char),
}

impl ContentPointer {
    /// Hash a byte slice into a pointer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(blake3::hash(bytes).as_bytes()))
    }

    /// Hash a file's contents into a pointer, streaming through a buffer.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open {} for hashing", path.display()))?;

        let mut reader = BufReader::with_capacity(64 * 1024, file);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; 64 * 1024];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to read {}", path.display()));
                }
            }
        }

        Ok(Self(hex::encode(hasher.finalize().as_bytes())))
    }

    /// Parse a pointer from an externally supplied hash string.
    ///
    /// Accepts any non-empty hex string (uppercase is normalized), so
    /// pointers produced by other hash functions remain addressable.
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        if s.is_empty() {
            return Err(PointerError::Empty);
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(PointerError::InvalidChar(bad));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The hash as a lowercase hex string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
