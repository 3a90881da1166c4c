//! CSV loading for the motor sensor table.
//!
//! Reads the raw readings file into [`RawReading`] rows. Missing cells are
//! kept as `None` here; dropping incomplete rows is the cleaner's job.

use std::io::Read;
use std::path::Path;

use motor_core::error::{MotorError, Result};
use motor_core::models::{Field, RawReading};
use tracing::{debug, error, info};

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the raw readings from a CSV file with a header row.
///
/// Emits exactly one status line: an `info!` on success, an `error!` naming
/// the failure otherwise. The error is returned to the caller, never raised
/// past it.
pub fn load_readings(path: &Path) -> Result<Vec<RawReading>> {
    let result = open_and_read(path);
    match &result {
        Ok(rows) => info!("Dataset '{}' loaded: {} rows", path.display(), rows.len()),
        Err(MotorError::FileNotFound(_)) => error!(
            "File '{}' not found; make sure it is in the working directory or check the path",
            path.display()
        ),
        Err(e) => error!("Failed to load dataset: {}", e),
    }
    result
}

/// Parse readings from any reader. `origin` is only used in error messages.
pub fn read_readings<R: Read>(reader: R, origin: &Path) -> Result<Vec<RawReading>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| csv_error(origin, source))?
        .clone();
    check_required_columns(&headers)?;

    let rows = csv_reader
        .deserialize::<RawReading>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| csv_error(origin, source))?;

    debug!(
        "Parsed {} rows with {} columns from {}",
        rows.len(),
        headers.len(),
        origin.display()
    );
    Ok(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open_and_read(path: &Path) -> Result<Vec<RawReading>> {
    let file = std::fs::File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            MotorError::FileNotFound(path.to_path_buf())
        } else {
            MotorError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    read_readings(std::io::BufReader::new(file), path)
}

/// Every source column must be present in the header. Extra columns are fine.
fn check_required_columns(headers: &csv::StringRecord) -> Result<()> {
    let required = Field::MEASUREMENTS
        .iter()
        .copied()
        .chain(std::iter::once(Field::Profile));
    for field in required {
        if !headers.iter().any(|h| h == field.code()) {
            return Err(MotorError::MissingColumn(field.code().to_string()));
        }
    }
    Ok(())
}

fn csv_error(origin: &Path, source: csv::Error) -> MotorError {
    MotorError::Csv {
        path: origin.to_path_buf(),
        source,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
