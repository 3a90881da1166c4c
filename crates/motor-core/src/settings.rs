use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MotorError, Result};
use crate::models::ProfileId;

/// Input file read when `--input` is not given.
pub const DEFAULT_INPUT: &str = "Electric_Motor_Temperature.csv";
/// Export destination used when `--output` is not given.
pub const DEFAULT_OUTPUT: &str = "motor_data_powerbi_ready.csv";
/// Sessions visualised when `--profiles` is not given.
pub const DEFAULT_PROFILES: [ProfileId; 3] = [ProfileId(11), ProfileId(29), ProfileId(6)];
/// Readings are assumed to be sampled at 2 Hz (0.5 s apart).
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 2.0;
/// Accepted `--log-level` names.
pub const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean, analyse, chart and export electric motor temperature recordings
#[derive(Parser, Debug, Clone)]
#[command(
    name = "motor-analysis",
    about = "Clean, analyse, chart and export electric motor temperature recordings",
    version
)]
pub struct Settings {
    /// CSV file with the raw sensor readings
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Export destination (.csv or .parquet)
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Session ids to chart, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_PROFILES.to_vec())]
    pub profiles: Vec<ProfileId>,

    /// Directory receiving the rendered PNG charts
    #[arg(long, default_value = "charts")]
    pub chart_dir: PathBuf,

    /// Print summaries without rendering charts
    #[arg(long)]
    pub no_charts: bool,

    /// Sampling rate of the recordings in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate_hz: f64,

    /// JSON config file (defaults to ~/.motor-analysis/config.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = LOG_LEVELS)]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── ConfigFile ─────────────────────────────────────────────────────────────────

/// Optional JSON configuration. Any field left out keeps the CLI default.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<ProfileId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_charts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Return the default config path, `~/.motor-analysis/config.json`.
    pub fn default_path() -> PathBuf {
        Self::default_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn default_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".motor-analysis").join("config.json")
    }

    /// Read a config file. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MotorError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let file: ConfigFile = serde_json::from_str(&content)?;
        tracing::debug!("Loaded config file {}", path.display());
        Ok(Some(file))
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with the config file where no explicit CLI
    /// value was provided, and validate the result.
    pub fn load() -> Result<Self> {
        Self::load_impl(std::env::args_os().collect(), &ConfigFile::default_path())
    }

    /// Full implementation – accepts args and the fallback config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_impl(args: Vec<std::ffi::OsString>, default_config: &Path) -> Result<Self> {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        let file = match &settings.config {
            Some(explicit) => Some(ConfigFile::load_from(explicit)?.ok_or_else(|| {
                MotorError::Config(format!("config file {} not found", explicit.display()))
            })?),
            None => ConfigFile::load_from(default_config)?,
        };

        if let Some(file) = file {
            settings.merge(file, &matches);
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Apply values from `file` to every field the command line left at its
    /// default. CLI always wins.
    fn merge(&mut self, file: ConfigFile, matches: &clap::ArgMatches) {
        if !is_arg_explicitly_set(matches, "input") {
            if let Some(v) = file.input {
                self.input = v;
            }
        }
        if !is_arg_explicitly_set(matches, "output") {
            if let Some(v) = file.output {
                self.output = v;
            }
        }
        if !is_arg_explicitly_set(matches, "profiles") {
            if let Some(v) = file.profiles {
                self.profiles = v;
            }
        }
        if !is_arg_explicitly_set(matches, "chart_dir") {
            if let Some(v) = file.chart_dir {
                self.chart_dir = v;
            }
        }
        if !is_arg_explicitly_set(matches, "no_charts") {
            if let Some(v) = file.no_charts {
                self.no_charts = v;
            }
        }
        // NOTE: clap stores the arg id using the *field name* (underscores),
        // not the long-flag spelling (hyphens).
        if !is_arg_explicitly_set(matches, "sample_rate_hz") {
            if let Some(v) = file.sample_rate_hz {
                self.sample_rate_hz = v;
            }
        }
        if !is_arg_explicitly_set(matches, "log_level") {
            if let Some(v) = file.log_level {
                self.log_level = v.to_uppercase();
            }
        }
        if !is_arg_explicitly_set(matches, "log_file") && self.log_file.is_none() {
            self.log_file = file.log_file;
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(MotorError::Config(format!(
                "sample rate must be a positive number of Hz, got {}",
                self.sample_rate_hz
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(MotorError::Config(format!(
                "unknown log level {:?}, expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Seconds between two consecutive readings of a session.
    pub fn sample_interval_seconds(&self) -> f64 {
        1.0 / self.sample_rate_hz
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
