//! Flows module - Multi-step operations built on the backends
//!
//! Provides:
//! - reconcile: Compare a scan with the tracked maximum and act on it
//! - monitor: Coordinator owning monitoring state and the busy guard

pub mod monitor;
pub mod reconcile;
