use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the motor analysis pipeline.
#[derive(Error, Debug)]
pub enum MotorError {
    /// The input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file or its directory could not be created.
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be read or written.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The CSV header lacks a required column.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A `profile_id` cell was not a non-negative integer.
    #[error("Invalid profile id: {0}")]
    InvalidProfileId(String),

    /// A stage received a table without rows.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// A column name did not match any known sensor field.
    #[error("Unknown column: {0}")]
    UnknownField(String),

    /// The export path has an extension other than `.csv` or `.parquet`.
    #[error("Unsupported export format: {0} (use '.csv' or '.parquet')")]
    UnsupportedFormat(PathBuf),

    /// The columnar writer failed.
    #[error("Parquet error: {0}")]
    Parquet(String),

    /// A chart could not be drawn or saved.
    #[error("Chart error: {0}")]
    Chart(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the motor crates.
pub type Result<T> = std::result::Result<T, MotorError>;
