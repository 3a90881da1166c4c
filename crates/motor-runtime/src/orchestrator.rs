//! Sequential analysis pipeline.
//!
//! Runs load → clean → inspect → describe → profiles → temperature trends →
//! operational trends → correlations → heatmap → export against one cleaned
//! dataset. A step that fails is logged and recorded in the
//! [`PipelineReport`]; steps that do not depend on it still run. A load
//! failure skips every remaining step. A table left empty by cleaning still
//! flows through: each stage decides what an empty table means for it.

use std::io::Write;
use std::path::PathBuf;

use motor_core::error::{MotorError, Result};
use motor_core::models::{MotorDataset, ProfileId};
use motor_core::settings::{
    Settings, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_PROFILES, DEFAULT_SAMPLE_RATE_HZ,
};
use motor_data::aggregator::ProfileAggregator;
use motor_data::analyzer::{CorrelationReport, DatasetAnalyzer};
use motor_data::cleaner::{Cleaner, CleaningReport};
use motor_data::exporter::{self, ExportSummary};
use motor_data::reader;
use motor_viz::text_report;
use motor_viz::visualizer::{SessionOutcome, Visualizer};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Rows shown at each end of the inspected table.
pub const PREVIEW_ROWS: usize = 5;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything one run needs, resolved from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Sessions to chart, in order.
    pub profiles: Vec<ProfileId>,
    /// `None` disables chart rendering.
    pub chart_dir: Option<PathBuf>,
    pub sample_rate_hz: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            profiles: DEFAULT_PROFILES.to_vec(),
            chart_dir: None,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

impl From<&Settings> for PipelineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            input: settings.input.clone(),
            output: settings.output.clone(),
            profiles: settings.profiles.clone(),
            chart_dir: (!settings.no_charts).then(|| settings.chart_dir.clone()),
            sample_rate_hz: settings.sample_rate_hz,
        }
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Load,
    Clean,
    Inspect,
    Describe,
    Profiles,
    TemperatureTrends,
    OperationalTrends,
    Correlations,
    Heatmap,
    Export,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Load,
        Step::Clean,
        Step::Inspect,
        Step::Describe,
        Step::Profiles,
        Step::TemperatureTrends,
        Step::OperationalTrends,
        Step::Correlations,
        Step::Heatmap,
        Step::Export,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Load => "load",
            Step::Clean => "clean",
            Step::Inspect => "inspect",
            Step::Describe => "describe",
            Step::Profiles => "profiles",
            Step::TemperatureTrends => "temperature_trends",
            Step::OperationalTrends => "operational_trends",
            Step::Correlations => "correlations",
            Step::Heatmap => "heatmap",
            Step::Export => "export",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedStep {
    pub step: Step,
    pub reason: String,
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub completed: Vec<Step>,
    pub skipped: Vec<SkippedStep>,
    pub cleaning: Option<CleaningReport>,
    /// Requested sessions with no readings.
    pub missing_profiles: Vec<ProfileId>,
    pub charts: Vec<PathBuf>,
    pub export: Option<ExportSummary>,
}

impl PipelineReport {
    /// `true` when no step was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped_step(&self, step: Step) -> Option<&SkippedStep> {
        self.skipped.iter().find(|s| s.step == step)
    }

    fn complete(&mut self, step: Step) {
        debug!("Step '{}' completed", step);
        self.completed.push(step);
    }

    fn skip(&mut self, step: Step, reason: &MotorError) {
        warn!("Step '{}' skipped: {}", step, reason);
        self.skipped.push(SkippedStep {
            step,
            reason: reason.to_string(),
        });
    }

    /// Skip `from` and every step after it.
    fn skip_from(&mut self, from: Step, reason: &MotorError) {
        for &step in Step::ALL.iter().skip_while(|&&s| s != from) {
            self.skip(step, reason);
        }
    }

    /// Record a fallible step and hand back its value on success.
    fn record<T>(&mut self, step: Step, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.complete(step);
                Some(value)
            }
            Err(e) => {
                self.skip(step, &e);
                None
            }
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct Pipeline {
    config: PipelineConfig,
    visualizer: Visualizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let visualizer = Visualizer::new(config.chart_dir.clone());
        Self { config, visualizer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every step, printing the console reports to stdout.
    pub fn run(&self) -> PipelineReport {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.run_with_output(&mut handle)
    }

    /// Run every step, writing the console reports to `out`.
    pub fn run_with_output<W: Write>(&self, out: &mut W) -> PipelineReport {
        info!(
            "Starting motor temperature analysis of '{}'",
            self.config.input.display()
        );
        let mut report = PipelineReport::default();

        let raw = match reader::load_readings(&self.config.input) {
            Ok(raw) => {
                report.complete(Step::Load);
                raw
            }
            Err(e) => {
                report.skip_from(Step::Load, &e);
                return report;
            }
        };

        let (dataset, cleaning) = Cleaner::with_sample_rate_hz(self.config.sample_rate_hz).clean(&raw);
        drop(raw);
        emit(out, &text_report::render_cleaning(&cleaning));
        report.cleaning = Some(cleaning);
        report.complete(Step::Clean);
        if dataset.is_empty() {
            warn!("No complete rows left after cleaning; continuing with an empty table");
        }

        self.analyze(&dataset, out, &mut report);
        self.visualize(&dataset, out, &mut report);

        match DatasetAnalyzer::correlations(&dataset) {
            Ok(correlations) => {
                report.complete(Step::Correlations);
                emit(out, &text_report::render_correlations(&correlations));
                self.heatmap(&correlations, out, &mut report);
            }
            Err(e) => {
                report.skip(Step::Correlations, &e);
                report.skip(Step::Heatmap, &e);
            }
        }

        if let Some(summary) = report.record(
            Step::Export,
            exporter::export_dataset(&dataset, &self.config.output),
        ) {
            emit(out, &text_report::render_export(&summary));
            report.export = Some(summary);
        }

        info!(
            "Analysis finished: {} step(s) completed, {} skipped",
            report.completed.len(),
            report.skipped.len()
        );
        report
    }

    fn analyze<W: Write>(&self, dataset: &MotorDataset, out: &mut W, report: &mut PipelineReport) {
        let overview = DatasetAnalyzer::overview(dataset, PREVIEW_ROWS);
        emit(out, &text_report::render_overview(&overview));
        report.complete(Step::Inspect);

        let rows = DatasetAnalyzer::describe(dataset);
        emit(out, &text_report::render_description(&rows));
        report.complete(Step::Describe);

        let profiles = ProfileAggregator::analyze(dataset);
        emit(out, &text_report::render_profiles(&profiles));
        report.complete(Step::Profiles);
    }

    fn visualize<W: Write>(&self, dataset: &MotorDataset, out: &mut W, report: &mut PipelineReport) {
        let profiles = &self.config.profiles;

        for outcome in self.visualizer.temperature_trends(dataset, profiles) {
            match &outcome {
                SessionOutcome::Missing(id) => record_missing(report, *id),
                SessionOutcome::Summarized { summary, charts } => {
                    emit(out, &text_report::render_temperature(summary));
                    report.charts.extend(charts.iter().cloned());
                }
            }
        }
        report.complete(Step::TemperatureTrends);

        for outcome in self.visualizer.operational_trends(dataset, profiles) {
            match &outcome {
                SessionOutcome::Missing(id) => record_missing(report, *id),
                SessionOutcome::Summarized { summary, charts } => {
                    emit(out, &text_report::render_operational(summary));
                    report.charts.extend(charts.iter().cloned());
                }
            }
        }
        report.complete(Step::OperationalTrends);
    }

    fn heatmap<W: Write>(&self, correlations: &CorrelationReport, out: &mut W, report: &mut PipelineReport) {
        let outcome = self.visualizer.correlation_heatmap(correlations);
        emit(out, &text_report::render_heatmap_summary(&outcome.pm_correlations));
        report.charts.extend(outcome.chart);
        report.complete(Step::Heatmap);
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn record_missing(report: &mut PipelineReport, profile_id: ProfileId) {
    if !report.missing_profiles.contains(&profile_id) {
        report.missing_profiles.push(profile_id);
    }
}

fn emit<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()) {
        debug!("Could not write report output: {}", e);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str =
        "u_q,coolant,stator_winding,u_d,stator_tooth,motor_speed,i_d,i_q,pm,stator_yoke,ambient,torque,profile_id";

    /// Two sessions plus one incomplete row.
    fn write_fixture(dir: &TempDir) -> PathBuf {
        let mut body = String::from(HEADER);
        body.push('\n');
        for (profile, rows) in [(11u32, 6usize), (6, 4)] {
            for i in 0..rows {
                let t = i as f64;
                body.push_str(&format!(
                    "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                    (t * 0.7).sin(),
                    18.0 + t * 0.1,
                    20.0 + 2.0 * t,
                    (t * 1.1).cos(),
                    19.0 + t,
                    1000.0 + 50.0 * t,
                    -t,
                    0.5 * t,
                    40.0 + 2.5 * t + f64::from(profile),
                    18.5 + 0.4 * t,
                    19.0 + (t % 2.0),
                    t - 2.0,
                    profile
                ));
            }
        }
        body.push_str("1,2,3,4,5,6,7,8,NA,10,11,12,11\n");
        let path = dir.path().join("motor.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn config(dir: &TempDir, input: PathBuf, output: &str) -> PipelineConfig {
        PipelineConfig {
            input,
            output: dir.path().join(output),
            profiles: vec![ProfileId(11), ProfileId(29), ProfileId(6)],
            chart_dir: None,
            sample_rate_hz: 2.0,
        }
    }

    #[test]
    fn test_full_run_completes_every_step() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(&tmp);
        let pipeline = Pipeline::new(config(&tmp, input, "ready.csv"));

        let mut out = Vec::new();
        let report = pipeline.run_with_output(&mut out);

        assert!(report.is_complete(), "skipped: {:?}", report.skipped);
        assert_eq!(report.completed, Step::ALL.to_vec());
        assert_eq!(report.missing_profiles, vec![ProfileId(29)]);
        assert!(report.charts.is_empty());

        let cleaning = report.cleaning.unwrap();
        assert_eq!(cleaning.rows_before, 11);
        assert_eq!(cleaning.rows_dropped, 1);

        let export = report.export.unwrap();
        assert_eq!(export.rows, 10);
        let written = std::fs::read_to_string(tmp.path().join("ready.csv")).unwrap();
        assert_eq!(written.lines().count(), 11);
        assert!(written.lines().next().unwrap().contains("rotor temperature in °C"));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Descriptive statistics"));
        assert!(text.contains("Temperature summary for profile 11"));
        assert!(text.contains("Operational summary for profile 6"));
        assert!(!text.contains("profile 29"));
        assert!(text.contains("Strongest correlations with pm:"));
    }

    #[test]
    fn test_missing_input_skips_everything() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp, tmp.path().join("absent.csv"), "ready.csv");
        let report = Pipeline::new(cfg).run_with_output(&mut Vec::new());

        assert!(report.completed.is_empty());
        assert_eq!(report.skipped.len(), Step::ALL.len());
        assert!(report
            .skipped_step(Step::Load)
            .unwrap()
            .reason
            .contains("absent.csv"));
        assert!(!tmp.path().join("ready.csv").exists());
    }

    #[test]
    fn test_unsupported_export_only_skips_export() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(&tmp);
        let report = Pipeline::new(config(&tmp, input, "ready.xlsx")).run_with_output(&mut Vec::new());

        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped_step(Step::Export).is_some());
        assert!(report.completed.contains(&Step::Heatmap));
        assert!(report.export.is_none());
        assert!(!tmp.path().join("ready.xlsx").exists());
    }

    #[test]
    fn test_all_rows_incomplete_still_exports_header() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("gaps.csv");
        std::fs::write(
            &input,
            format!("{}\n1,2,3,4,5,6,7,8,,10,11,12,4\n", HEADER),
        )
        .unwrap();
        let mut out = Vec::new();
        let report = Pipeline::new(config(&tmp, input, "ready.csv")).run_with_output(&mut out);

        assert_eq!(
            report.completed,
            vec![
                Step::Load,
                Step::Clean,
                Step::Inspect,
                Step::Describe,
                Step::Profiles,
                Step::TemperatureTrends,
                Step::OperationalTrends,
                Step::Export,
            ]
        );
        let skipped: Vec<Step> = report.skipped.iter().map(|s| s.step).collect();
        assert_eq!(skipped, vec![Step::Correlations, Step::Heatmap]);
        assert_eq!(
            report.missing_profiles,
            vec![ProfileId(11), ProfileId(29), ProfileId(6)]
        );

        assert_eq!(report.export.unwrap().rows, 0);
        let written = std::fs::read_to_string(tmp.path().join("ready.csv")).unwrap();
        assert_eq!(written.lines().count(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unique sessions: 0"));
    }

    #[test]
    fn test_uncreatable_export_dir_only_skips_export() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(&tmp);
        std::fs::write(tmp.path().join("blocker"), "plain file").unwrap();
        let report = Pipeline::new(config(&tmp, input, "blocker/ready.csv"))
            .run_with_output(&mut Vec::new());

        let skipped: Vec<Step> = report.skipped.iter().map(|s| s.step).collect();
        assert_eq!(skipped, vec![Step::Export]);
        assert!(report
            .skipped_step(Step::Export)
            .unwrap()
            .reason
            .contains("blocker"));
        assert!(report.completed.contains(&Step::Heatmap));
    }

    #[test]
    fn test_export_creates_output_directory() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(&tmp);
        let report = Pipeline::new(config(&tmp, input, "out/nested/ready.csv"))
            .run_with_output(&mut Vec::new());

        assert!(report.is_complete(), "skipped: {:?}", report.skipped);
        assert!(tmp.path().join("out").join("nested").join("ready.csv").is_file());
    }

    #[test]
    fn test_full_run_writes_charts() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(&tmp);
        let chart_dir = tmp.path().join("charts");
        let mut cfg = config(&tmp, input, "ready.csv");
        cfg.chart_dir = Some(chart_dir.clone());

        let report = Pipeline::new(cfg).run_with_output(&mut Vec::new());
        assert!(report.is_complete(), "skipped: {:?}", report.skipped);

        let expected: Vec<PathBuf> = [
            "profile_11_temperatures.png",
            "profile_6_temperatures.png",
            "profile_11_speed_torque.png",
            "profile_11_currents_voltages.png",
            "profile_6_speed_torque.png",
            "profile_6_currents_voltages.png",
            "correlation_heatmap.png",
        ]
        .iter()
        .map(|name| chart_dir.join(name))
        .collect();
        assert_eq!(report.charts, expected);

        for chart in &report.charts {
            let bytes = std::fs::read(chart).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", chart.display());
        }
        assert!(!chart_dir.join("profile_29_temperatures.png").exists());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::load_impl(
            vec!["motor-analysis".into(), "--no-charts".into(), "--profiles".into(), "3,4".into()],
            std::path::Path::new("/nonexistent/config.json"),
        )
        .unwrap();
        let cfg = PipelineConfig::from(&settings);
        assert_eq!(cfg.chart_dir, None);
        assert_eq!(cfg.profiles, vec![ProfileId(3), ProfileId(4)]);
        assert_eq!(cfg.output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_report_serializes_step_names() {
        let mut report = PipelineReport::default();
        report.complete(Step::TemperatureTrends);
        report.skip(Step::Export, &MotorError::UnsupportedFormat(PathBuf::from("x.xlsx")));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["completed"][0], "temperature_trends");
        assert_eq!(json["skipped"][0]["step"], "export");
    }
}
