//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Version resolution and ordering
//! - Data model for scans, reconciliation and sync outcomes
//! - Configuration and its validation
//! - Error types
//! - Rendering functions for different output formats
//! - Path and filesystem utilities

pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
pub mod version;
