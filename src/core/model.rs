//! Data model
//!
//! Every scan, reconcile and synchronize step produces one of these types
//! before anything is rendered or logged.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::core::version::VersionTuple;

/// A file that passed the naming filter and carries a resolvable version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Absolute (or search-root joined) path of the file
    pub path: PathBuf,

    /// File name including extension
    pub name: String,

    pub version: VersionTuple,

    /// Containing directory relative to the search root, `.` for the root
    pub relative_dir: String,
}

impl CandidateFile {
    pub fn version_str(&self) -> String {
        self.version.to_string()
    }
}

/// Candidates ordered newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanResult {
    files: Vec<CandidateFile>,
}

impl ScanResult {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Build a result from candidates in discovery order. The sort is stable,
    /// so equal versions keep their discovery order.
    pub fn from_candidates(mut files: Vec<CandidateFile>) -> Self {
        files.sort_by(|a, b| b.version.cmp(&a.version));
        Self { files }
    }

    /// The current maximum
    pub fn head(&self) -> Option<&CandidateFile> {
        self.files.first()
    }

    #[allow(dead_code)]
    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateFile> {
        self.files.iter()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for ScanResult {
    type Item = CandidateFile;
    type IntoIter = std::vec::IntoIter<CandidateFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<CandidateFile> for ScanResult {
    fn from_iter<T: IntoIterator<Item = CandidateFile>>(iter: T) -> Self {
        Self::from_candidates(iter.into_iter().collect())
    }
}

/// A stale file that could not be removed from the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub file: String,
    pub message: String,
}

/// What a synchronize pass did to the target directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// File name of the winner that was copied in
    pub winner: String,

    /// Names of stale files that were removed
    pub deleted: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deletion_failures: Vec<DeletionFailure>,

    /// Set when the target could not be listed, so nothing was deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,

    /// Destination of the copy, set only when it succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_to: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_error: Option<String>,
}

impl SyncOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn copy_succeeded(&self) -> bool {
        self.copied_to.is_some()
    }
}

/// The copy step of a new maximum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CopyStep {
    /// Auto-copy is turned off
    Disabled,
    Synced { outcome: SyncOutcome },
    /// Synchronize aborted before touching the target
    Aborted { error: String },
}

/// What a reconcile step decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    NoCandidates,
    Unchanged {
        name: String,
        version: VersionTuple,
    },
    NewMaximum {
        name: String,
        version: VersionTuple,
        copy: CopyStep,
    },
}

/// Result of a reconcile step: the action plus the tracked maximum to carry
/// into the next cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub tracked_max: Option<VersionTuple>,
    pub action: ReconcileAction,
}

/// A line for the presentation log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, version: &[u64]) -> CandidateFile {
        CandidateFile {
            path: PathBuf::from("/src").join(name),
            name: name.to_string(),
            version: VersionTuple::from(version.to_vec()),
            relative_dir: ".".to_string(),
        }
    }

    #[test]
    fn test_scan_result_sorted_descending() {
        let result = ScanResult::from_candidates(vec![
            candidate("qc_a1.2.3.apk", &[1, 2, 3]),
            candidate("qc_a1.10.0.apk", &[1, 10, 0]),
            candidate("qc_a0.9.apk", &[0, 9]),
        ]);

        let names: Vec<_> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["qc_a1.10.0.apk", "qc_a1.2.3.apk", "qc_a0.9.apk"]);
        assert_eq!(result.head().unwrap().version_str(), "1.10.0");
    }

    #[test]
    fn test_scan_result_ties_keep_discovery_order() {
        let result = ScanResult::from_candidates(vec![
            candidate("qc_first2.apk", &[2]),
            candidate("qc_old1.apk", &[1]),
            candidate("qc_second2.apk", &[2]),
        ]);

        let names: Vec<_> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["qc_first2.apk", "qc_second2.apk", "qc_old1.apk"]);
    }

    #[test]
    fn test_scan_result_empty() {
        let result = ScanResult::new();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert!(result.head().is_none());
    }

    #[test]
    fn test_scan_result_from_iter_sorts() {
        let result: ScanResult = vec![candidate("qc_a1.apk", &[1]), candidate("qc_a3.apk", &[3])]
            .into_iter()
            .collect();
        assert_eq!(result.head().unwrap().name, "qc_a3.apk");
    }

    #[test]
    fn test_sync_outcome_counts() {
        let outcome = SyncOutcome {
            winner: "qc_a2.apk".to_string(),
            deleted: vec!["qc_a1.apk".to_string()],
            copied_to: Some(PathBuf::from("/dst/qc_a2.apk")),
            ..SyncOutcome::default()
        };
        assert_eq!(outcome.deleted_count(), 1);
        assert!(outcome.copy_succeeded());
        assert!(!SyncOutcome::default().copy_succeeded());
    }

    #[test]
    fn test_reconcile_action_serialization() {
        let action = ReconcileAction::NewMaximum {
            name: "qc_a2.apk".to_string(),
            version: VersionTuple::from(vec![2]),
            copy: CopyStep::Disabled,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"action\":\"new_maximum\""));
        assert!(json.contains("\"status\":\"disabled\""));
        assert!(json.contains("\"version\":[2]"));
    }

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry::now("hello");
        let line = entry.to_string();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] hello"));
        // [HH:MM:SS]
        assert_eq!(line.find(']'), Some(9));
    }
}
