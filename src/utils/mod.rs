//! Path and mtime utilities.
//!
//! Pure helpers with no knowledge of the publishing layout:
//! - [`path`]: filesystem path normalization and symlink creation
//! - [`mtime`]: modification-time freshness checks

pub mod mtime;
pub mod path;

pub use mtime::{get_mtime, is_output_fresh};
pub use path::normalize_path;
