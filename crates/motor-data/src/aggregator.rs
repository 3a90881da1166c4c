//! Per-session aggregation of the cleaned readings.

use motor_core::models::{Field, MotorDataset, ProfileId, Reading};
use motor_core::statistics::{self, MinMaxMean};
use serde::Serialize;
use tracing::debug;

/// Duration of one recorded session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionDuration {
    pub profile_id: ProfileId,
    /// Largest elapsed time in the session.
    pub duration_seconds: f64,
    /// Number of readings in the session.
    pub readings: usize,
}

/// Session metadata for the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    /// Number of distinct `profile_id` values.
    pub session_count: usize,
    /// Distinct `profile_id` values, ascending.
    pub profile_ids: Vec<ProfileId>,
    /// One entry per session, ascending by id.
    pub durations: Vec<SessionDuration>,
    pub mean_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

/// Stateless collection of session-level aggregations.
pub struct ProfileAggregator;

impl ProfileAggregator {
    /// Duration of each session, ascending by id.
    pub fn session_durations(dataset: &MotorDataset) -> Vec<SessionDuration> {
        dataset
            .sessions()
            .into_iter()
            .map(|(profile_id, readings)| SessionDuration {
                profile_id,
                duration_seconds: readings
                    .iter()
                    .map(|r| r.elapsed_seconds)
                    .fold(0.0, f64::max),
                readings: readings.len(),
            })
            .collect()
    }

    /// Count, list and time the sessions, plus duration aggregates.
    ///
    /// An empty table reports zero sessions and NaN duration aggregates.
    pub fn analyze(dataset: &MotorDataset) -> ProfileReport {
        let durations = Self::session_durations(dataset);
        let seconds: Vec<f64> = durations.iter().map(|d| d.duration_seconds).collect();
        let MinMaxMean { min, max, mean } = MinMaxMean::from_values(&seconds);

        debug!("ProfileAggregator: {} sessions", durations.len());
        ProfileReport {
            session_count: durations.len(),
            profile_ids: durations.iter().map(|d| d.profile_id).collect(),
            durations,
            mean_duration: mean,
            min_duration: min,
            max_duration: max,
        }
    }

    /// Min/max/mean of each requested column over a slice of readings.
    pub fn column_stats(readings: &[&Reading], fields: &[Field]) -> Vec<(Field, MinMaxMean)> {
        fields
            .iter()
            .map(|&field| {
                let values: Vec<f64> = readings.iter().map(|r| r.value(field)).collect();
                (field, MinMaxMean::from_values(&values))
            })
            .collect()
    }

    /// Values of one column over a slice of readings, in order.
    pub fn series(readings: &[&Reading], field: Field) -> Vec<f64> {
        readings.iter().map(|r| r.value(field)).collect()
    }

    /// Mean of one column over a slice of readings.
    pub fn mean(readings: &[&Reading], field: Field) -> f64 {
        statistics::mean(&Self::series(readings, field))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
