//! Numeric summaries printed next to each chart.
//!
//! These are pure functions of a session's readings, so they are computed
//! whether or not chart rendering is enabled.

use motor_core::models::{Field, ProfileId, Reading};
use motor_core::statistics::{self, MinMaxMean};
use motor_data::aggregator::ProfileAggregator;
use serde::Serialize;

/// Relative change that counts as a significant rise or fall.
pub const TREND_THRESHOLD: f64 = 0.05;

/// Direction of the rotor temperature over a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// `Increasing` when `final_value > initial * 1.05`, `Decreasing` when
    /// `final_value < initial * 0.95`, otherwise `Stable`.
    ///
    /// The thresholds scale `initial` directly, so for a negative initial
    /// value the band is mirrored.
    pub fn classify(initial: f64, final_value: f64) -> Self {
        if final_value > initial * (1.0 + TREND_THRESHOLD) {
            Trend::Increasing
        } else if final_value < initial * (1.0 - TREND_THRESHOLD) {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temperature figures of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSummary {
    pub profile_id: ProfileId,
    pub stats: Vec<(Field, MinMaxMean)>,
    pub initial_pm: f64,
    pub final_pm: f64,
    pub peak_pm: f64,
    /// Elapsed time of the first reading holding `peak_pm`.
    pub peak_time_seconds: f64,
    pub trend: Trend,
}

impl TemperatureSummary {
    /// `None` when the session has no readings.
    pub fn from_session(profile_id: ProfileId, readings: &[&Reading]) -> Option<Self> {
        let first = readings.first()?;
        let last = readings.last()?;
        let pm = ProfileAggregator::series(readings, Field::Pm);
        let peak_index = statistics::argmax(&pm)?;
        let peak = readings[peak_index];

        Some(Self {
            profile_id,
            stats: ProfileAggregator::column_stats(readings, &Field::TEMPERATURES),
            initial_pm: first.pm,
            final_pm: last.pm,
            peak_pm: peak.pm,
            peak_time_seconds: peak.elapsed_seconds,
            trend: Trend::classify(first.pm, last.pm),
        })
    }

    /// `final - initial` for a rise, `initial - final` for a fall, zero when
    /// stable.
    pub fn net_change(&self) -> f64 {
        match self.trend {
            Trend::Increasing => self.final_pm - self.initial_pm,
            Trend::Decreasing => self.initial_pm - self.final_pm,
            Trend::Stable => 0.0,
        }
    }
}

/// Speed, torque and control-signal figures of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalSummary {
    pub profile_id: ProfileId,
    pub stats: Vec<(Field, MinMaxMean)>,
    pub avg_speed: f64,
    pub max_speed: f64,
    pub avg_torque: f64,
    pub peak_abs_torque: f64,
    /// Any negative torque in the session.
    pub regenerative_braking: bool,
}

impl OperationalSummary {
    pub fn from_session(profile_id: ProfileId, readings: &[&Reading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        let speed = ProfileAggregator::series(readings, Field::MotorSpeed);
        let torque = ProfileAggregator::series(readings, Field::Torque);
        let abs_torque: Vec<f64> = torque.iter().map(|t| t.abs()).collect();

        Some(Self {
            profile_id,
            stats: ProfileAggregator::column_stats(readings, &Field::OPERATIONAL),
            avg_speed: statistics::mean(&speed),
            max_speed: statistics::max(&speed),
            avg_torque: statistics::mean(&torque),
            peak_abs_torque: statistics::max(&abs_torque),
            regenerative_braking: statistics::min(&torque) < 0.0,
        })
    }
}
