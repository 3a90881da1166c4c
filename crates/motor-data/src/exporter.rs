//! Export of the cleaned table with descriptive column headers, ready for a
//! BI tool.
//!
//! The destination format follows the file extension: `.csv` is written with
//! the `csv` crate, `.parquet` through a `polars` data frame. Any other
//! extension is refused without touching the filesystem.

use std::path::{Path, PathBuf};

use motor_core::error::{MotorError, Result};
use motor_core::models::{Field, MotorDataset};
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// File formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    /// Pick the format from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(ExportFormat::Csv)
        } else if ext.eq_ignore_ascii_case("parquet") {
            Some(ExportFormat::Parquet)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Parquet => f.write_str("parquet"),
        }
    }
}

/// What was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub rows: usize,
    pub columns: usize,
}

/// Descriptive headers in column order.
pub fn export_headers() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.export_label()).collect()
}

/// Rename the columns to their descriptive labels and write the dataset.
///
/// Row and column counts are unchanged. An unsupported extension logs a
/// warning and returns [`MotorError::UnsupportedFormat`] without creating a
/// file.
pub fn export_dataset(dataset: &MotorDataset, path: &Path) -> Result<ExportSummary> {
    info!("Preparing dataset export to '{}'", path.display());

    let Some(format) = ExportFormat::from_path(path) else {
        warn!(
            "Unsupported export format for '{}'; use '.csv' or '.parquet'",
            path.display()
        );
        return Err(MotorError::UnsupportedFormat(path.to_path_buf()));
    };

    ensure_parent_dir(path)?;
    match format {
        ExportFormat::Csv => write_csv(dataset, path)?,
        ExportFormat::Parquet => write_parquet(dataset, path)?,
    }

    info!("Dataset exported as '{}' ({})", path.display(), format);
    Ok(ExportSummary {
        path: path.to_path_buf(),
        format,
        rows: dataset.len(),
        columns: Field::ALL.len(),
    })
}

// ── Writers ───────────────────────────────────────────────────────────────────

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|source| MotorError::FileWrite {
                path: parent.to_path_buf(),
                source,
            }),
        _ => Ok(()),
    }
}

/// Comma-delimited, no index column, `.` decimal separator.
fn write_csv(dataset: &MotorDataset, path: &Path) -> Result<()> {
    let csv_err = |source: csv::Error| MotorError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(export_headers()).map_err(csv_err)?;

    for reading in dataset.readings() {
        let record = Field::ALL.iter().map(|&field| match field {
            Field::Profile => reading.profile_id.to_string(),
            _ => reading.value(field).to_string(),
        });
        writer.write_record(record).map_err(csv_err)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_parquet(dataset: &MotorDataset, path: &Path) -> Result<()> {
    let mut frame = to_data_frame(dataset).map_err(parquet_err)?;
    let file = std::fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(&mut frame)
        .map_err(parquet_err)?;
    Ok(())
}

/// Columnar copy of the dataset, headed by the export labels.
pub fn to_data_frame(dataset: &MotorDataset) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = Field::ALL
        .iter()
        .map(|&field| {
            let name = PlSmallStr::from_static(field.export_label());
            match field {
                Field::Profile => {
                    let ids: Vec<u32> = dataset.readings().iter().map(|r| r.profile_id.0).collect();
                    Column::new(name, ids)
                }
                _ => Column::new(name, dataset.column(field)),
            }
        })
        .collect();
    DataFrame::new(columns)
}

fn parquet_err(e: PolarsError) -> MotorError {
    MotorError::Parquet(e.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use motor_core::models::{ProfileId, Reading};
    use tempfile::TempDir;

    fn make_dataset() -> MotorDataset {
        [40.0, 42.0, 45.0]
            .iter()
            .enumerate()
            .map(|(i, &pm)| Reading {
                u_q: -0.45,
                coolant: 18.8,
                stator_winding: 19.08,
                u_d: -0.35,
                stator_tooth: 18.29,
                motor_speed: 1500.25,
                i_d: -2.0,
                i_q: 0.5,
                pm,
                stator_yoke: 18.31,
                ambient: 19.85,
                torque: -0.18,
                profile_id: ProfileId(11),
                elapsed_seconds: i as f64 * 0.5,
            })
            .collect()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("dir/out.PARQUET")),
            Some(ExportFormat::Parquet)
        );
        assert_eq!(ExportFormat::from_path(Path::new("out.xlsx")), None);
        assert_eq!(ExportFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn test_export_headers_cover_every_column() {
        let headers = export_headers();
        assert_eq!(headers.len(), 14);
        assert_eq!(headers[8], "rotor temperature in °C");
        assert_eq!(headers[12], "test session id");
        assert_eq!(headers[13], "session time in seconds");
    }

    #[test]
    fn test_export_csv_renames_and_keeps_rows() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("motor_data_powerbi_ready.csv");
        let dataset = make_dataset();

        let summary = export_dataset(&dataset, &path).expect("export");
        assert_eq!(summary.format, ExportFormat::Csv);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 14);

        let mut reader = csv::Reader::from_path(&path).expect("reopen");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(headers.len(), 14);
        assert!(headers.iter().any(|h| h == "rotor temperature in °C"));
        assert!(!headers.iter().any(|h| h == "pm"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][8], "45");
        assert_eq!(&rows[0][5], "1500.25");
        assert_eq!(&rows[1][12], "11");
        assert_eq!(&rows[1][13], "0.5");
    }

    #[test]
    fn test_export_csv_has_no_index_column() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("out.csv");
        export_dataset(&make_dataset(), &path).expect("export");

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap();
        assert!(first.starts_with("voltage q-component in V,"));
        assert!(content.lines().nth(1).unwrap().starts_with("-0.45,"));
    }

    #[test]
    fn test_export_parquet_writes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("out.parquet");

        let summary = export_dataset(&make_dataset(), &path).expect("export");
        assert_eq!(summary.format, ExportFormat::Parquet);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PAR1"));
        assert!(bytes.ends_with(b"PAR1"));
    }

    #[test]
    fn test_data_frame_shape() {
        let frame = to_data_frame(&make_dataset()).expect("frame");
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.width(), 14);
    }

    #[test]
    fn test_export_unsupported_format_writes_nothing() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("out.xlsx");

        let result = export_dataset(&make_dataset(), &path);
        assert!(matches!(result, Err(MotorError::UnsupportedFormat(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_empty_dataset_writes_header_only() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("empty.csv");
        let summary = export_dataset(&MotorDataset::default(), &path).expect("export");
        assert_eq!(summary.rows, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_creates_missing_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("reports").join("2024").join("ready.csv");

        export_dataset(&make_dataset(), &path).expect("export");
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_export_uncreatable_directory_is_reported() {
        let tmp = TempDir::new().expect("tempdir");
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = export_dataset(&make_dataset(), &blocker.join("ready.csv"));
        match result {
            Err(MotorError::FileWrite { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected FileWrite, got {:?}", other),
        }
    }
}
