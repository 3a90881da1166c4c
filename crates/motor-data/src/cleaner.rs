//! Missing-value removal and elapsed-time synthesis.

use std::collections::HashMap;

use motor_core::models::{Field, MotorDataset, ProfileId, RawReading};
use motor_core::settings::DEFAULT_SAMPLE_RATE_HZ;
use tracing::{debug, info, warn};

/// What the cleaner did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_dropped: usize,
    /// NaN or infinite cells left after dropping incomplete rows.
    pub remaining_non_finite: usize,
}

/// Drops incomplete rows and derives the per-session time axis.
#[derive(Debug, Clone, Copy)]
pub struct Cleaner {
    sample_interval_seconds: f64,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::with_sample_rate_hz(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl Cleaner {
    /// Create a cleaner with an explicit spacing between readings.
    pub fn new(sample_interval_seconds: f64) -> Self {
        Self {
            sample_interval_seconds,
        }
    }

    pub fn with_sample_rate_hz(sample_rate_hz: f64) -> Self {
        Self::new(1.0 / sample_rate_hz)
    }

    pub fn sample_interval_seconds(&self) -> f64 {
        self.sample_interval_seconds
    }

    /// Remove every row with a missing cell, then stamp each remaining row
    /// with `position_in_session * interval`.
    ///
    /// Sessions are grouped by `profile_id` without reordering: a row's
    /// position counts only earlier rows of the same session, so interleaved
    /// sessions each still start at 0.
    pub fn clean(&self, raw: &[RawReading]) -> (MotorDataset, CleaningReport) {
        info!("Starting data cleaning and preparation");

        let rows_before = raw.len();
        let mut positions: HashMap<ProfileId, usize> = HashMap::new();
        let dataset: MotorDataset = raw
            .iter()
            .filter(|row| row.missing_count() == 0)
            .filter_map(|row| {
                let profile_id = row.profile_id?;
                let position = positions.entry(profile_id).or_insert(0);
                let elapsed = *position as f64 * self.sample_interval_seconds;
                *position += 1;
                row.complete(elapsed)
            })
            .collect();

        let rows_after = dataset.len();
        let rows_dropped = rows_before - rows_after;
        if rows_dropped > 0 {
            info!("Removed {} row(s) with missing values", rows_dropped);
        } else {
            info!("No rows with missing values found");
        }

        let remaining_non_finite = dataset.non_finite_count();
        if remaining_non_finite == 0 {
            info!("Dataset is free of missing values");
        } else {
            warn!(
                "{} non-finite value(s) remain after basic cleaning",
                remaining_non_finite
            );
        }

        let elapsed = dataset.column(Field::ElapsedSeconds);
        info!(
            "Column '{}' generated for {} session(s)",
            Field::ElapsedSeconds,
            positions.len()
        );
        debug!("First elapsed values: {:?}", &elapsed[..elapsed.len().min(5)]);
        debug!(
            "Last elapsed values: {:?}",
            &elapsed[elapsed.len().saturating_sub(5)..]
        );
        info!("Data cleaning and preparation completed");

        (
            dataset,
            CleaningReport {
                rows_before,
                rows_after,
                rows_dropped,
                remaining_non_finite,
            },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(profile: Option<u32>, pm: Option<f64>) -> RawReading {
        RawReading {
            u_q: Some(-0.45),
            coolant: Some(18.8),
            stator_winding: Some(19.08),
            u_d: Some(-0.35),
            stator_tooth: Some(18.29),
            motor_speed: Some(0.002),
            i_d: Some(0.004),
            i_q: Some(0.0003),
            pm,
            stator_yoke: Some(18.31),
            ambient: Some(19.85),
            torque: Some(0.18),
            profile_id: profile.map(ProfileId),
        }
    }

    #[test]
    fn test_clean_drops_incomplete_rows() {
        let rows = vec![
            raw(Some(1), Some(20.0)),
            raw(Some(1), None),
            raw(None, Some(21.0)),
            raw(Some(1), Some(f64::NAN)),
            raw(Some(1), Some(22.0)),
        ];
        let (dataset, report) = Cleaner::default().clean(&rows);

        assert_eq!(report.rows_before, 5);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.rows_dropped, 3);
        assert_eq!(report.remaining_non_finite, 0);
        assert_eq!(dataset.column(Field::Pm), vec![20.0, 22.0]);
    }

    #[test]
    fn test_clean_reports_zero_dropped_when_complete() {
        let rows = vec![raw(Some(1), Some(20.0)), raw(Some(1), Some(21.0))];
        let (_, report) = Cleaner::default().clean(&rows);
        assert_eq!(report.rows_dropped, 0);
    }

    #[test]
    fn test_elapsed_time_restarts_per_session() {
        let rows = vec![
            raw(Some(4), Some(1.0)),
            raw(Some(4), Some(2.0)),
            raw(Some(4), Some(3.0)),
            raw(Some(9), Some(4.0)),
            raw(Some(9), Some(5.0)),
        ];
        let (dataset, _) = Cleaner::default().clean(&rows);
        assert_eq!(
            dataset.column(Field::ElapsedSeconds),
            vec![0.0, 0.5, 1.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_elapsed_time_with_interleaved_sessions() {
        let rows = vec![
            raw(Some(2), Some(1.0)),
            raw(Some(7), Some(2.0)),
            raw(Some(2), Some(3.0)),
            raw(Some(7), Some(4.0)),
            raw(Some(2), Some(5.0)),
        ];
        let (dataset, _) = Cleaner::default().clean(&rows);

        for readings in dataset.sessions().values() {
            for (i, reading) in readings.iter().enumerate() {
                assert_eq!(reading.elapsed_seconds, i as f64 * 0.5);
            }
        }
        assert_eq!(
            dataset.column(Field::ElapsedSeconds),
            vec![0.0, 0.0, 0.5, 0.5, 1.0]
        );
    }

    #[test]
    fn test_dropped_rows_do_not_advance_session_clock() {
        let rows = vec![
            raw(Some(3), Some(1.0)),
            raw(Some(3), None),
            raw(Some(3), Some(2.0)),
        ];
        let (dataset, _) = Cleaner::default().clean(&rows);
        assert_eq!(dataset.column(Field::ElapsedSeconds), vec![0.0, 0.5]);
    }

    #[test]
    fn test_custom_sample_rate() {
        let rows = vec![raw(Some(1), Some(1.0)), raw(Some(1), Some(2.0))];
        let cleaner = Cleaner::with_sample_rate_hz(10.0);
        assert!((cleaner.sample_interval_seconds() - 0.1).abs() < 1e-12);
        let (dataset, _) = cleaner.clean(&rows);
        assert!((dataset.readings()[1].elapsed_seconds - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_clean_empty_input() {
        let (dataset, report) = Cleaner::default().clean(&[]);
        assert!(dataset.is_empty());
        assert_eq!(report.rows_before, 0);
        assert_eq!(report.rows_dropped, 0);
    }

    #[test]
    fn test_infinite_values_are_kept_and_counted() {
        let rows = vec![raw(Some(1), Some(f64::INFINITY))];
        let (dataset, report) = Cleaner::default().clean(&rows);
        assert_eq!(dataset.len(), 1);
        assert_eq!(report.remaining_non_finite, 1);
    }
}
