//! Data layer for the motor temperature analysis.
//!
//! Reads the raw sensor CSV, drops incomplete rows and synthesises the
//! per-session time axis, computes session, descriptive and correlation
//! statistics, and exports the cleaned table with descriptive headers.

pub mod aggregator;
pub mod analyzer;
pub mod cleaner;
pub mod exporter;
pub mod reader;

pub use motor_core as core;
