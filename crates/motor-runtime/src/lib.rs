//! Runtime layer for the motor temperature analysis.
//!
//! Resolves the run configuration and drives the data and reporting crates
//! through the analysis pipeline, one step after another.

pub mod orchestrator;

pub use motor_core as core;
pub use motor_data as data;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineReport, SkippedStep, Step};
