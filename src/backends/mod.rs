//! Backends module - Filesystem operations
//!
//! Provides:
//! - scan: Candidate discovery with walkdir
//! - sync: Delete-old-then-copy into the target directory
//! - watch: Periodic monitoring loop

pub mod scan;
pub mod sync;
pub mod watch;
