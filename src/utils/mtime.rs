//! Mtime-based freshness detection for mirrored files.
//!
//! Mirroring preserves the source's modification time on the target, so a
//! target whose mtime is equal to or newer than the source's is up to date.
//! This is a freshness heuristic, not a content comparison: callers that
//! overwrite sources within the filesystem's timestamp granularity must not
//! rely on it.

use std::path::Path;
use std::time::SystemTime;

/// Check if an output file is newer than the given source mtime.
///
/// Returns `true` if the output exists and its mtime is equal to or newer
/// than `source_mtime`, meaning the output is fresh and mirroring can be
/// skipped.
pub fn is_output_fresh(output: &Path, source_mtime: Option<SystemTime>) -> bool {
    let Some(source_time) = source_mtime else {
        return false;
    };

    output
        .metadata()
        .and_then(|m| m.modified())
        .map(|output_time| output_time >= source_time)
        .unwrap_or(false)
}

/// Get the modification time of a file.
///
/// Returns `None` if the file doesn't exist or mtime cannot be read.
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        assert!(!is_output_fresh(&dir.path().join("missing"), Some(now)));
    }

    #[test]
    fn test_missing_source_mtime_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");
        fs::write(&output, "x").unwrap();
        assert!(!is_output_fresh(&output, None));
    }

    #[test]
    fn test_equal_mtime_is_fresh() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");
        fs::write(&output, "x").unwrap();

        let time = SystemTime::now();
        set_mtime(&output, time);

        assert!(is_output_fresh(&output, Some(time)));
    }

    #[test]
    fn test_older_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");
        fs::write(&output, "x").unwrap();

        let source_time = SystemTime::now();
        set_mtime(&output, source_time - Duration::from_secs(5));

        assert!(!is_output_fresh(&output, Some(source_time)));
    }

    #[test]
    fn test_get_mtime_missing() {
        let dir = TempDir::new().unwrap();
        assert!(get_mtime(&dir.path().join("missing")).is_none());
    }
}
