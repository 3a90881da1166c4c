//! Per-session trend charts and the correlation heatmap.
//!
//! Summaries are always computed. Charts are written only when a chart
//! directory is configured; a chart that cannot be rendered is logged and
//! left out without affecting the summary.

use std::path::{Path, PathBuf};

use motor_core::error::Result;
use motor_core::models::{Field, MotorDataset, ProfileId, Reading};
use motor_data::analyzer::CorrelationReport;
use tracing::{debug, info, warn};

use crate::charts::{
    self, LineChart, CURRENTS_VOLTAGES_CHART, SPEED_TORQUE_CHART, TEMPERATURE_CHART,
};
use crate::heatmap;
use crate::summaries::{OperationalSummary, TemperatureSummary};

/// File name of the heatmap inside the chart directory.
pub const HEATMAP_FILE: &str = "correlation_heatmap.png";

/// Result of visualising one requested session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome<T> {
    /// No readings carry this id; nothing was drawn.
    Missing(ProfileId),
    Summarized { summary: T, charts: Vec<PathBuf> },
}

impl<T> SessionOutcome<T> {
    pub fn summary(&self) -> Option<&T> {
        match self {
            SessionOutcome::Missing(_) => None,
            SessionOutcome::Summarized { summary, .. } => Some(summary),
        }
    }

    pub fn charts(&self) -> &[PathBuf] {
        match self {
            SessionOutcome::Missing(_) => &[],
            SessionOutcome::Summarized { charts, .. } => charts,
        }
    }
}

/// Heatmap output: the rendered file, if any, and `pm` against every other
/// column, sorted descending.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOutcome {
    pub chart: Option<PathBuf>,
    pub pm_correlations: Vec<(Field, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    chart_dir: Option<PathBuf>,
}

impl Visualizer {
    /// `None` disables chart rendering.
    pub fn new(chart_dir: Option<PathBuf>) -> Self {
        Self { chart_dir }
    }

    pub fn chart_dir(&self) -> Option<&Path> {
        self.chart_dir.as_deref()
    }

    /// Temperature chart and summary for each requested session.
    pub fn temperature_trends(
        &self,
        dataset: &MotorDataset,
        profiles: &[ProfileId],
    ) -> Vec<SessionOutcome<TemperatureSummary>> {
        info!("Generating temperature trend visualisations");
        profiles
            .iter()
            .map(|&id| {
                self.visit_session(dataset, id, &[TEMPERATURE_CHART], TemperatureSummary::from_session)
            })
            .collect()
    }

    /// Speed/torque and currents/voltages charts plus the operational summary.
    pub fn operational_trends(
        &self,
        dataset: &MotorDataset,
        profiles: &[ProfileId],
    ) -> Vec<SessionOutcome<OperationalSummary>> {
        info!("Generating operational trend visualisations");
        profiles
            .iter()
            .map(|&id| {
                self.visit_session(
                    dataset,
                    id,
                    &[SPEED_TORQUE_CHART, CURRENTS_VOLTAGES_CHART],
                    OperationalSummary::from_session,
                )
            })
            .collect()
    }

    fn visit_session<T>(
        &self,
        dataset: &MotorDataset,
        profile_id: ProfileId,
        kinds: &[LineChart],
        summarize: fn(ProfileId, &[&Reading]) -> Option<T>,
    ) -> SessionOutcome<T> {
        let readings = dataset.session(profile_id);
        let Some(summary) = summarize(profile_id, &readings) else {
            warn!("No data found for profile_id {}; skipping", profile_id);
            return SessionOutcome::Missing(profile_id);
        };

        debug!("Profile {}: {} readings", profile_id, readings.len());
        let charts = kinds
            .iter()
            .filter_map(|&chart| {
                self.render(&chart.kind.file_name(profile_id), |path| {
                    charts::render_line_chart(path, chart, profile_id, &readings)
                })
            })
            .collect();

        SessionOutcome::Summarized { summary, charts }
    }

    /// Heatmap of the correlation matrix plus the ranking printed beside it.
    pub fn correlation_heatmap(&self, report: &CorrelationReport) -> HeatmapOutcome {
        info!("Generating correlation matrix visualisation");
        let chart = self.render(HEATMAP_FILE, |path| {
            heatmap::render_heatmap(path, &report.matrix)
        });
        HeatmapOutcome {
            chart,
            pm_correlations: report.matrix.ranking_without_self(Field::Pm),
        }
    }

    /// Run `draw` against `<chart_dir>/<file_name>`. Failures are logged and
    /// yield `None`.
    fn render<F>(&self, file_name: &str, draw: F) -> Option<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let dir = self.chart_dir.as_deref()?;
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(
                "Cannot create chart directory '{}': {}; skipping '{}'",
                dir.display(),
                e,
                file_name
            );
            return None;
        }

        let path = dir.join(file_name);
        match draw(&path) {
            Ok(()) => {
                info!("Chart written to '{}'", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Chart '{}' skipped: {}", file_name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summaries::Trend;
    use motor_data::analyzer::DatasetAnalyzer;
    use tempfile::TempDir;

    fn make_dataset() -> MotorDataset {
        let pms = [40.0, 42.0, 45.0];
        let mut readings: Vec<Reading> = pms
            .iter()
            .enumerate()
            .map(|(i, &pm)| reading(11, pm, i as f64 * 0.5, -1.0 + i as f64))
            .collect();
        readings.push(reading(6, 60.0, 0.0, 3.0));
        readings.push(reading(6, 55.0, 0.5, 4.0));
        MotorDataset::new(readings)
    }

    fn reading(profile: u32, pm: f64, elapsed: f64, torque: f64) -> Reading {
        Reading {
            u_q: elapsed * 3.0,
            coolant: 18.0 + elapsed,
            stator_winding: pm - 1.0,
            u_d: -elapsed,
            stator_tooth: pm - 2.0 + elapsed * 0.1,
            motor_speed: 1000.0 * (elapsed + 1.0),
            i_d: -elapsed * 2.0,
            i_q: elapsed + 0.3,
            pm,
            stator_yoke: pm - 3.0 - elapsed,
            ambient: 20.0 + pm * 0.01,
            torque,
            profile_id: ProfileId(profile),
            elapsed_seconds: elapsed,
        }
    }

    #[test]
    fn test_temperature_trends_without_charts() {
        let viz = Visualizer::new(None);
        let outcomes = viz.temperature_trends(&make_dataset(), &[ProfileId(11), ProfileId(6)]);

        assert_eq!(outcomes.len(), 2);
        let first = outcomes[0].summary().unwrap();
        assert_eq!(first.peak_pm, 45.0);
        assert_eq!(first.peak_time_seconds, 1.0);
        assert_eq!(first.trend, Trend::Increasing);
        assert!(outcomes[0].charts().is_empty());

        assert_eq!(outcomes[1].summary().unwrap().trend, Trend::Decreasing);
    }

    #[test]
    fn test_missing_profile_is_skipped() {
        let tmp = TempDir::new().expect("tempdir");
        let viz = Visualizer::new(Some(tmp.path().join("charts")));
        let outcomes = viz.temperature_trends(&make_dataset(), &[ProfileId(99)]);

        assert_eq!(outcomes, vec![SessionOutcome::Missing(ProfileId(99))]);
        let dir = tmp.path().join("charts");
        let any_chart = dir.exists()
            && std::fs::read_dir(&dir)
                .unwrap()
                .any(|e| e.unwrap().file_name().to_string_lossy().contains("99"));
        assert!(!any_chart);
    }

    #[test]
    fn test_operational_trends_mixed_profiles() {
        let viz = Visualizer::new(None);
        let outcomes = viz.operational_trends(&make_dataset(), &[ProfileId(29), ProfileId(11)]);

        assert!(matches!(outcomes[0], SessionOutcome::Missing(ProfileId(29))));
        let summary = outcomes[1].summary().unwrap();
        assert!(summary.regenerative_braking);
        assert_eq!(summary.peak_abs_torque, 1.0);
    }

    #[test]
    fn test_heatmap_ranking_excludes_pm() {
        let report = DatasetAnalyzer::correlations(&make_dataset()).unwrap();
        let outcome = Visualizer::new(None).correlation_heatmap(&report);

        assert!(outcome.chart.is_none());
        assert_eq!(outcome.pm_correlations.len(), 11);
        assert!(outcome.pm_correlations.iter().all(|(f, _)| *f != Field::Pm));
    }

    #[test]
    fn test_render_failure_is_not_fatal() {
        let tmp = TempDir::new().expect("tempdir");
        let viz = Visualizer::new(Some(tmp.path().to_path_buf()));
        let path = viz.render("broken.png", |_| {
            Err(motor_core::error::MotorError::Chart("no font".to_string()))
        });
        assert!(path.is_none());
    }
}
