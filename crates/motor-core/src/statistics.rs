//! Numeric routines shared by the analyzer and the visualizer.
//!
//! All functions are NaN-propagating in the pandas sense: an empty input or an
//! undefined result (zero variance, fewer than two samples) yields `NaN`
//! rather than an error.

use serde::Serialize;

// ── Scalar statistics ─────────────────────────────────────────────────────────

/// Arithmetic mean, `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (denominator `n - 1`).
///
/// Returns `NaN` when fewer than two values are given.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() as f64 - 1.0)).sqrt()
}

/// Smallest value, `NaN` for an empty slice.
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

/// Largest value, `NaN` for an empty slice.
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Index of the first occurrence of the largest value.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Compute the `p`-th percentile of a **sorted** slice using linear
/// interpolation between closest ranks (NumPy's default method).
///
/// Returns `NaN` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

/// Pearson correlation coefficient of two equally long series.
///
/// Returns `NaN` when the lengths differ, fewer than two pairs exist, or either
/// series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

// ── Summaries ─────────────────────────────────────────────────────────────────

/// Range and average of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinMaxMean {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl MinMaxMean {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            min: min(values),
            max: max(values),
            mean: mean(values),
        }
    }
}

/// The eight figures of a `describe()` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise a series. NaN values are excluded from every figure.
    pub fn describe(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        Self {
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q75: percentile(&sorted, 75.0),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Descending order with `NaN` placed last, for ranking correlations.
pub fn descending_nan_last(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
