//! Shared foundation for the motor analysis workspace.
//!
//! Holds the column model and typed readings, the error type, the numeric
//! routines used by every stage, console formatting helpers and the CLI
//! settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod statistics;

pub use error::{MotorError, Result};
pub use models::{Field, MotorDataset, ProfileId, RawReading, Reading};
