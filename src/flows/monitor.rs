//! Monitor coordinator
//!
//! Owns the tracked maximum and the last scan result, runs at most one
//! scan-and-reconcile cycle at a time, and reports to a [`MonitorListener`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::backends::scan::scan;
use crate::backends::sync::synchronize;
use crate::core::config::MonitorConfig;
use crate::core::model::{
    CopyStep, LogEntry, ReconcileAction, Reconciliation, ScanResult, SyncOutcome,
};
use crate::core::render::describe_outcome;
use crate::core::version::VersionTuple;
use crate::flows::reconcile::reconcile;

/// Receives everything a presentation layer shows
pub trait MonitorListener: Send + Sync {
    fn on_scan_complete(&self, result: &ScanResult);
    fn on_log(&self, entry: &LogEntry);
}

impl<T: MonitorListener> MonitorListener for Arc<T> {
    fn on_scan_complete(&self, result: &ScanResult) {
        (**self).on_scan_complete(result);
    }

    fn on_log(&self, entry: &LogEntry) {
        (**self).on_log(entry);
    }
}

/// Mutable state carried from cycle to cycle
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub tracked_max: Option<VersionTuple>,
    pub last_results: ScanResult,
}

/// What a trigger ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Declined: monitor stopped or another cycle in flight
    Skipped,
    /// Scan could not run (e.g. search root missing)
    Failed(String),
    Completed(Reconciliation),
}

/// Holds the busy flag for the lifetime of one operation
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Monitor<L: MonitorListener> {
    config: MonitorConfig,
    listener: L,
    running: AtomicBool,
    checking: AtomicBool,
    state: Mutex<MonitorState>,
}

impl<L: MonitorListener> Monitor<L> {
    pub fn new(config: MonitorConfig, listener: L) -> Self {
        Self {
            config,
            listener,
            running: AtomicBool::new(false),
            checking: AtomicBool::new(false),
            state: Mutex::new(MonitorState::default()),
        }
    }

    #[allow(dead_code)]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Send a line to the presentation log
    pub fn log(&self, message: impl Into<String>) {
        let entry = LogEntry::now(message);
        info!(target: "qcsync::monitor", "{}", entry.message);
        self.listener.on_log(&entry);
    }

    /// Start monitoring. Returns false when already running.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.log(format!(
            "Started monitoring QC APK files (max version preferred), interval {} minute(s)",
            self.config.check_interval_minutes
        ));
        true
    }

    /// Stop monitoring. Returns false when already stopped. A cycle in
    /// flight runs to completion.
    pub fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.log("Stopped monitoring QC APK files");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[allow(dead_code)]
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    #[allow(dead_code)]
    pub fn tracked_max(&self) -> Option<VersionTuple> {
        self.lock_state().tracked_max.clone()
    }

    #[allow(dead_code)]
    pub fn last_results(&self) -> ScanResult {
        self.lock_state().last_results.clone()
    }

    /// Timer entry point. Declines while stopped.
    pub fn tick(&self) -> CycleOutcome {
        if !self.is_running() {
            debug!("timer tick while stopped, ignoring");
            return CycleOutcome::Skipped;
        }
        self.run_cycle()
    }

    /// Manual trigger. Like a timer tick, it declines while stopped.
    pub fn scan_now(&self) -> CycleOutcome {
        if !self.is_running() {
            debug!("manual scan while stopped, ignoring");
            return CycleOutcome::Skipped;
        }
        self.run_cycle()
    }

    /// Synchronize the head of the last scan result into the target,
    /// ignoring the tracked maximum.
    pub fn copy_latest(&self) -> Option<SyncOutcome> {
        let Some(_busy) = BusyGuard::acquire(&self.checking) else {
            self.log("A scan is in progress, try copying again when it finishes");
            return None;
        };

        let Some(winner) = self.lock_state().last_results.head().cloned() else {
            self.log("No QC APK files found");
            return None;
        };

        match synchronize(&winner.path, &self.config.target_path, &self.config.version_pattern) {
            Ok(outcome) => {
                self.log_outcome(&outcome);
                Some(outcome)
            }
            Err(e) => {
                self.log(format!("Cannot copy APK: {}", e));
                None
            }
        }
    }

    fn run_cycle(&self) -> CycleOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.checking) else {
            debug!("cycle already in flight, skipping trigger");
            return CycleOutcome::Skipped;
        };

        self.log("Scanning for QC APK files, looking for the max version...");

        let result = match scan(&self.config.search_path, &self.config.version_pattern) {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Scan failed: {}", e);
                self.log(message.clone());
                return CycleOutcome::Failed(message);
            }
        };

        if result.is_empty() {
            self.log("No valid QC APK files found (a numeric version is required)");
        } else {
            self.listener.on_scan_complete(&result);
        }

        // cycles are serialized by the busy flag; the lock is not held across target I/O
        let tracked_max = self.lock_state().tracked_max.clone();
        let reconciliation = reconcile(
            &result,
            &self.config.target_path,
            tracked_max.as_ref(),
            self.config.auto_copy,
            &self.config.version_pattern,
        );

        {
            let mut state = self.lock_state();
            state.tracked_max = reconciliation.tracked_max.clone();
            if !result.is_empty() {
                state.last_results = result;
            }
        }

        self.log_action(&reconciliation.action);
        CycleOutcome::Completed(reconciliation)
    }

    fn log_action(&self, action: &ReconcileAction) {
        match action {
            ReconcileAction::NoCandidates => {}
            ReconcileAction::Unchanged { name, version } => {
                self.log(format!("Max version unchanged: {} ({})", version, name));
            }
            ReconcileAction::NewMaximum {
                name,
                version,
                copy,
            } => {
                self.log(format!(
                    "New max version found: {} (version {})",
                    name, version
                ));
                match copy {
                    CopyStep::Disabled => debug!("auto-copy disabled"),
                    CopyStep::Synced { outcome } => self.log_outcome(outcome),
                    CopyStep::Aborted { error } => {
                        self.log(format!("Cannot copy APK: {}", error));
                    }
                }
            }
        }
    }

    fn log_outcome(&self, outcome: &SyncOutcome) {
        for line in describe_outcome(outcome) {
            self.log(line);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        // the state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
