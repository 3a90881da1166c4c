//! Visual and textual reporting for the motor temperature analysis.
//!
//! Renders per-session trend charts and the correlation heatmap to PNG with
//! [`plotters`], computes the numeric summaries shown next to each chart, and
//! formats every console report of the pipeline.

pub mod charts;
pub mod heatmap;
pub mod palette;
pub mod summaries;
pub mod text_report;
pub mod visualizer;

pub use motor_core as core;
