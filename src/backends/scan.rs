//! Candidate scanning backend
//!
//! Walks the search root with walkdir and ranks every QC APK by its
//! resolved version.

use anyhow::Result;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::error::{PathRole, SyncError};
use crate::core::model::{CandidateFile, ScanResult};
use crate::core::paths::{is_candidate_name, relative_dir};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::version::VersionPattern;

/// Scan `root` recursively for candidate files, newest first.
///
/// Entries are visited in file-name order, so candidates with equal versions
/// keep a deterministic order. An empty result means nothing matched.
pub fn scan(root: &Path, pattern: &VersionPattern) -> Result<ScanResult, SyncError> {
    if !root.is_dir() {
        return Err(SyncError::PathMissing {
            role: PathRole::Search,
            path: root.to_path_buf(),
        });
    }

    let mut candidates = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !is_candidate_name(&name) {
            continue;
        }

        let Some(version) = pattern.resolve(&name) else {
            debug!(file = %name, "no numeric version, skipping");
            continue;
        };

        let dir = entry.path().parent().unwrap_or(root);
        candidates.push(CandidateFile {
            path: entry.path().to_path_buf(),
            name: name.into_owned(),
            version,
            relative_dir: relative_dir(dir, root),
        });
    }

    Ok(ScanResult::from_candidates(candidates))
}

/// Run the scan command
pub fn run_scan(root: &Path, pattern: &VersionPattern, config: RenderConfig) -> Result<()> {
    let result = scan(root, pattern)?;

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result));

    Ok(())
}
