//! Path and file-name helpers
//!
//! Relative paths are normalized to use '/' as separator.

use std::path::Path;

use crate::core::config::{FILE_EXTENSION, FILE_MARKER};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Directory of a file relative to the search root, `.` for the root itself
pub fn relative_dir(dir: &Path, root: &Path) -> String {
    match make_relative(dir, root) {
        Some(rel) if !rel.is_empty() => rel,
        Some(_) => ".".to_string(),
        None => normalize_path(dir),
    }
}

/// True when the name carries the candidate marker and extension
pub fn is_candidate_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains(FILE_MARKER) && lower.ends_with(FILE_EXTENSION)
}

/// File name without its last extension
pub fn strip_extension(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}
