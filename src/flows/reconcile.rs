//! Reconcile a scan against the tracked maximum
//!
//! The tracked maximum is passed in and handed back, never held here, so a
//! caller can run the step deterministically.

use std::path::Path;

use crate::backends::sync::synchronize;
use crate::core::model::{CopyStep, ReconcileAction, Reconciliation, ScanResult};
use crate::core::version::{VersionPattern, VersionTuple};

/// Decide what to do with a scan result.
///
/// A head strictly newer than `tracked_max` (or any head when nothing is
/// tracked yet) becomes the new maximum and, with `auto_copy`, is
/// synchronized into `target_dir`. The tracked maximum never decreases.
pub fn reconcile(
    scan: &ScanResult,
    target_dir: &Path,
    tracked_max: Option<&VersionTuple>,
    auto_copy: bool,
    pattern: &VersionPattern,
) -> Reconciliation {
    let Some(winner) = scan.head() else {
        return Reconciliation {
            tracked_max: tracked_max.cloned(),
            action: ReconcileAction::NoCandidates,
        };
    };

    let is_new = tracked_max.map_or(true, |max| winner.version > *max);
    if !is_new {
        return Reconciliation {
            tracked_max: tracked_max.cloned(),
            action: ReconcileAction::Unchanged {
                name: winner.name.clone(),
                version: winner.version.clone(),
            },
        };
    }

    let copy = if auto_copy {
        match synchronize(&winner.path, target_dir, pattern) {
            Ok(outcome) => CopyStep::Synced { outcome },
            Err(e) => CopyStep::Aborted {
                error: e.to_string(),
            },
        }
    } else {
        CopyStep::Disabled
    };

    Reconciliation {
        tracked_max: Some(winner.version.clone()),
        action: ReconcileAction::NewMaximum {
            name: winner.name.clone(),
            version: winner.version.clone(),
            copy,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::scan::scan;
    use std::fs;
    use tempfile::tempdir;

    fn v(components: &[u64]) -> VersionTuple {
        VersionTuple::from(components.to_vec())
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_reconcile_empty_scan_keeps_tracked_max() {
        let target = tempdir().unwrap();
        let tracked = v(&[1, 0]);

        let result = reconcile(
            &ScanResult::new(),
            target.path(),
            Some(&tracked),
            true,
            &VersionPattern::default(),
        );

        assert_eq!(result.action, ReconcileAction::NoCandidates);
        assert_eq!(result.tracked_max, Some(tracked));
    }

    #[test]
    fn test_reconcile_first_scan_copies_winner() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("qc_app1.2.3.apk"), b"a").unwrap();
        fs::write(source.path().join("qc_app1.10.0.apk"), b"b").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();

        let result = reconcile(&result_set, target.path(), None, true, &pattern);

        assert_eq!(result.tracked_max, Some(v(&[1, 10, 0])));
        match result.action {
            ReconcileAction::NewMaximum {
                name,
                copy: CopyStep::Synced { outcome },
                ..
            } => {
                assert_eq!(name, "qc_app1.10.0.apk");
                assert!(outcome.copy_succeeded());
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert_eq!(listing(target.path()), vec!["qc_app1.10.0.apk"]);
    }

    #[test]
    fn test_reconcile_unchanged_max_takes_no_action() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("qc_app2.0.0.apk"), b"v2").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();
        let tracked = v(&[2, 0, 0]);

        let result = reconcile(&result_set, target.path(), Some(&tracked), true, &pattern);

        assert_eq!(result.tracked_max, Some(v(&[2, 0, 0])));
        assert!(matches!(result.action, ReconcileAction::Unchanged { .. }));
        assert!(listing(target.path()).is_empty());
    }

    #[test]
    fn test_reconcile_lower_version_does_not_decrease_tracked_max() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("qc_app1.apk"), b"v1").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();
        let tracked = v(&[5]);

        let result = reconcile(&result_set, target.path(), Some(&tracked), true, &pattern);

        assert_eq!(result.tracked_max, Some(v(&[5])));
        assert!(matches!(result.action, ReconcileAction::Unchanged { .. }));
    }

    #[test]
    fn test_reconcile_twice_acts_once() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("qc_app3.apk"), b"v3").unwrap();
        fs::write(target.path().join("qc_app2.apk"), b"v2").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();

        let first = reconcile(&result_set, target.path(), None, true, &pattern);
        assert!(matches!(first.action, ReconcileAction::NewMaximum { .. }));

        // a file dropped into the target after the first pass must survive
        fs::write(target.path().join("qc_app1.apk"), b"v1").unwrap();

        let second = reconcile(
            &result_set,
            target.path(),
            first.tracked_max.as_ref(),
            true,
            &pattern,
        );
        assert!(matches!(second.action, ReconcileAction::Unchanged { .. }));
        assert_eq!(second.tracked_max, first.tracked_max);
        assert_eq!(listing(target.path()), vec!["qc_app1.apk", "qc_app3.apk"]);
    }

    #[test]
    fn test_reconcile_auto_copy_disabled_still_tracks() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("qc_app4.apk"), b"v4").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();

        let result = reconcile(&result_set, target.path(), None, false, &pattern);

        assert_eq!(result.tracked_max, Some(v(&[4])));
        assert!(matches!(
            result.action,
            ReconcileAction::NewMaximum {
                copy: CopyStep::Disabled,
                ..
            }
        ));
        assert!(listing(target.path()).is_empty());
    }

    #[test]
    fn test_reconcile_missing_target_aborts_copy_but_tracks() {
        let source = tempdir().unwrap();
        fs::write(source.path().join("qc_app4.apk"), b"v4").unwrap();
        let pattern = VersionPattern::default();
        let result_set = scan(source.path(), &pattern).unwrap();
        let missing = source.path().join("missing");

        let result = reconcile(&result_set, &missing, None, true, &pattern);

        assert_eq!(result.tracked_max, Some(v(&[4])));
        match result.action {
            ReconcileAction::NewMaximum {
                copy: CopyStep::Aborted { error },
                ..
            } => assert!(error.contains("target path does not exist")),
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(!missing.exists());
    }
}
