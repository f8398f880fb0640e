//! Error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which configured root a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Search,
    Target,
}

impl fmt::Display for PathRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRole::Search => f.write_str("search"),
            PathRole::Target => f.write_str("target"),
        }
    }
}

/// Rejected before monitoring starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} path is required")]
    EmptyPath(PathRole),

    #[error("check interval must be a whole number of minutes, got {0:?}")]
    InvalidInterval(String),

    #[error("check interval must be at least one minute, got {0}")]
    NonPositiveInterval(i64),

    #[error("check interval must be at most {max} minutes, got {got}")]
    IntervalTooLarge { got: i64, max: u64 },

    #[error("invalid version pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("version pattern {pattern:?} must have exactly one capture group, found {found}")]
    CaptureGroups { pattern: String, found: usize },
}

/// Aborts a single scan or synchronize step
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{role} path does not exist: {}", path.display())]
    PathMissing { role: PathRole, path: PathBuf },
}
