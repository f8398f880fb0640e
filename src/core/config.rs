//! Monitor configuration
//!
//! Values arrive as raw strings (from flags or environment) and are
//! validated into a [`MonitorConfig`] before any monitoring starts.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{ConfigError, PathRole};
use crate::core::version::{VersionPattern, DEFAULT_VERSION_PATTERN};

/// Default check interval in minutes
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 5;

/// Longest accepted check interval: one year
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Marker every candidate file name must contain (case-insensitive)
pub const FILE_MARKER: &str = "qc";

/// Extension every candidate file name must end with (case-insensitive)
pub const FILE_EXTENSION: &str = ".apk";

/// Unvalidated configuration as supplied by the caller
#[derive(Debug, Clone)]
pub struct RawConfig {
    pub search_path: String,
    pub target_path: String,
    pub check_interval: String,
    pub version_pattern: String,
    pub auto_copy: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            search_path: String::new(),
            target_path: String::new(),
            check_interval: DEFAULT_CHECK_INTERVAL_MINUTES.to_string(),
            version_pattern: DEFAULT_VERSION_PATTERN.to_string(),
            auto_copy: true,
        }
    }
}

impl RawConfig {
    /// Check the hard preconditions for monitoring and compile the pattern.
    pub fn validate(self) -> Result<MonitorConfig, ConfigError> {
        if self.search_path.trim().is_empty() {
            return Err(ConfigError::EmptyPath(PathRole::Search));
        }
        if self.target_path.trim().is_empty() {
            return Err(ConfigError::EmptyPath(PathRole::Target));
        }

        let interval = parse_interval(&self.check_interval)?;
        let version_pattern = VersionPattern::new(&self.version_pattern)?;

        Ok(MonitorConfig {
            search_path: PathBuf::from(self.search_path),
            target_path: PathBuf::from(self.target_path),
            check_interval_minutes: interval,
            version_pattern,
            auto_copy: self.auto_copy,
        })
    }
}

/// Parse a check interval given in whole minutes.
pub fn parse_interval(raw: &str) -> Result<u64, ConfigError> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidInterval(raw.to_string()))?;

    if minutes < 1 {
        return Err(ConfigError::NonPositiveInterval(minutes));
    }
    if minutes as u64 > MAX_CHECK_INTERVAL_MINUTES {
        return Err(ConfigError::IntervalTooLarge {
            got: minutes,
            max: MAX_CHECK_INTERVAL_MINUTES,
        });
    }

    Ok(minutes as u64)
}

/// Validated monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub search_path: PathBuf,
    pub target_path: PathBuf,
    pub check_interval_minutes: u64,
    pub version_pattern: VersionPattern,
    pub auto_copy: bool,
}

impl MonitorConfig {
    pub fn new(search_path: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
            target_path: target_path.into(),
            check_interval_minutes: DEFAULT_CHECK_INTERVAL_MINUTES,
            version_pattern: VersionPattern::default(),
            auto_copy: true,
        }
    }

    pub fn with_auto_copy(mut self, auto_copy: bool) -> Self {
        self.auto_copy = auto_copy;
        self
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.min(MAX_CHECK_INTERVAL_MINUTES) * 60)
    }
}
