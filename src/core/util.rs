//! Common filesystem utilities

use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;

/// Copy `from` to `to`, overwriting `to`, and carry over the modification
/// time. Failing to set the time is not an error: some filesystems do not
/// support it.
pub fn copy_preserving_mtime(from: &Path, to: &Path) -> io::Result<u64> {
    let bytes = fs::copy(from, to)?;

    let metadata = fs::metadata(from)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    if let Err(e) = filetime::set_file_times(to, atime, mtime) {
        tracing::debug!(path = %to.display(), error = %e, "could not preserve file times");
    }

    Ok(bytes)
}
