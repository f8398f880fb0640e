//! Target synchronization backend
//!
//! Removes older builds of the winner's series from the target directory,
//! then copies the winner in. The two steps are not transactional: when the
//! copy fails after stale files were deleted, the target holds no build of
//! that series until the next successful cycle.

use anyhow::Result;
use regex::NoExpand;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::backends::scan::scan;
use crate::core::config::{FILE_EXTENSION, FILE_MARKER};
use crate::core::error::{PathRole, SyncError};
use crate::core::model::{DeletionFailure, SyncOutcome};
use crate::core::paths::strip_extension;
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::copy_preserving_mtime;
use crate::core::version::VersionPattern;

/// Series key of a file name: every pattern match replaced by the marker,
/// extension dropped, lower-cased.
///
/// `qc_app1.2.3.apk` with the default pattern yields `qc`.
pub fn series_key(file_name: &str, pattern: &VersionPattern) -> String {
    let replaced = pattern
        .regex()
        .replace_all(file_name, NoExpand(FILE_MARKER));
    strip_extension(&replaced).to_lowercase()
}

/// True for target entries that belong to the winner's series and are not
/// the winner itself
fn is_stale(name: &OsStr, winner_name: &OsStr, key: &str) -> bool {
    let lower = name.to_string_lossy().to_lowercase();
    lower.contains(FILE_MARKER)
        && lower.contains(key)
        && !same_name(name, winner_name)
        && lower.ends_with(FILE_EXTENSION)
}

/// Case-insensitive for UTF-8 names, byte-exact otherwise
fn same_name(a: &OsStr, b: &OsStr) -> bool {
    match (a.to_str(), b.to_str()) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => a == b,
    }
}

/// Delete stale files of the winner's series from `target_dir`, then copy
/// the winner in under its own name.
///
/// Only a missing target aborts. Listing, deletion and copy failures are
/// recorded in the returned outcome.
pub fn synchronize(
    winner_path: &Path,
    target_dir: &Path,
    pattern: &VersionPattern,
) -> Result<SyncOutcome, SyncError> {
    synchronize_with(winner_path, target_dir, pattern, |path| fs::remove_file(path))
}

fn synchronize_with<F>(
    winner_path: &Path,
    target_dir: &Path,
    pattern: &VersionPattern,
    mut remove: F,
) -> Result<SyncOutcome, SyncError>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    if !target_dir.is_dir() {
        return Err(SyncError::PathMissing {
            role: PathRole::Target,
            path: target_dir.to_path_buf(),
        });
    }

    let winner_os = winner_path.file_name().unwrap_or_default();
    let winner_name = winner_os.to_string_lossy().into_owned();
    let key = series_key(&winner_name, pattern);

    let mut outcome = SyncOutcome {
        winner: winner_name.clone(),
        ..SyncOutcome::default()
    };

    match fs::read_dir(target_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
                if !is_file {
                    continue;
                }

                let raw_name = entry.file_name();
                if !is_stale(&raw_name, winner_os, &key) {
                    continue;
                }

                let name = raw_name.to_string_lossy().into_owned();
                match remove(&entry.path()) {
                    Ok(()) => {
                        info!(file = %name, "deleted old version");
                        outcome.deleted.push(name);
                    }
                    Err(e) => {
                        warn!(file = %name, error = %e, "failed to delete old version");
                        outcome.deletion_failures.push(DeletionFailure {
                            file: name,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        Err(e) => {
            warn!(dir = %target_dir.display(), error = %e, "could not list target directory");
            outcome.listing_error = Some(e.to_string());
        }
    }

    let dest = target_dir.join(winner_os);
    match copy_preserving_mtime(winner_path, &dest) {
        Ok(_) => {
            info!(file = %winner_name, "copied max version to target");
            outcome.copied_to = Some(dest);
        }
        Err(e) => {
            warn!(file = %winner_name, error = %e, "copy failed");
            outcome.copy_error = Some(e.to_string());
        }
    }

    Ok(outcome)
}

/// Run the sync command: scan, then copy the newest candidate into the
/// target regardless of what was seen before.
pub fn run_sync(
    search: &Path,
    target: &Path,
    pattern: &VersionPattern,
    config: RenderConfig,
) -> Result<()> {
    let result = scan(search, pattern)?;
    let renderer = Renderer::with_config(config);

    let Some(winner) = result.head() else {
        anyhow::bail!("no QC APK files with a numeric version under {}", search.display());
    };

    let outcome = synchronize(&winner.path, target, pattern)?;
    println!("{}", renderer.render_outcome(&outcome));

    if let Some(error) = &outcome.copy_error {
        anyhow::bail!("copy of {} failed: {}", outcome.winner, error);
    }

    Ok(())
}
