//! Read-only analyses of the cleaned dataset: overview, descriptive
//! statistics and the Pearson correlation matrix.

use motor_core::error::Result;
use motor_core::models::{Field, MotorDataset, Reading};
use motor_core::statistics::{self, ColumnSummary};
use serde::Serialize;
use tracing::debug;

/// Number of strongest `pm` correlations highlighted in the report.
pub const TOP_CORRELATIONS: usize = 3;

// ── Overview ──────────────────────────────────────────────────────────────────

/// Schema line of the overview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub field: Field,
    pub non_null: usize,
    pub dtype: &'static str,
}

/// Shape, schema and the first/last rows of the cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub head: Vec<Reading>,
    pub tail: Vec<Reading>,
}

// ── Descriptive statistics ────────────────────────────────────────────────────

/// One `describe()` row: a column and its summary figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub field: Field,
    pub summary: ColumnSummary,
}

// ── Correlation ───────────────────────────────────────────────────────────────

/// Square, symmetric matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    fields: Vec<Field>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of `fields` over the whole dataset.
    ///
    /// The diagonal is exactly 1.0 unless the column is constant, in which
    /// case the whole row and column are NaN.
    pub fn compute(dataset: &MotorDataset, fields: &[Field]) -> Self {
        let columns: Vec<Vec<f64>> = fields.iter().map(|&f| dataset.column(f)).collect();
        let n = fields.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = statistics::pearson(&columns[i], &columns[j]);
                let r = if i == j && !r.is_nan() { 1.0 } else { r };
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            fields: fields.to_vec(),
            values,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Coefficient at matrix position `(row, col)`.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Coefficient of two named columns, `None` if either is not in the matrix.
    pub fn get(&self, a: Field, b: Field) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    fn index_of(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|&f| f == field)
    }

    /// The column of `target`, sorted descending (NaN last). Includes
    /// `target` itself.
    pub fn ranking(&self, target: Field) -> Vec<(Field, f64)> {
        let Some(col) = self.index_of(target) else {
            return Vec::new();
        };
        let mut ranked: Vec<(Field, f64)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(row, &field)| (field, self.values[row][col]))
            .collect();
        ranked.sort_by(|a, b| statistics::descending_nan_last(a.1, b.1));
        ranked
    }

    /// Like [`ranking`](Self::ranking) but without `target` itself.
    pub fn ranking_without_self(&self, target: Field) -> Vec<(Field, f64)> {
        self.ranking(target)
            .into_iter()
            .filter(|(field, _)| *field != target)
            .collect()
    }
}

/// Correlation matrix plus the rotor-temperature focus.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    /// `pm` column sorted descending, `pm` itself included.
    pub pm_ranking: Vec<(Field, f64)>,
    /// The strongest correlations with `pm`, excluding `pm`.
    pub top_pm: Vec<(Field, f64)>,
}

// ── DatasetAnalyzer ───────────────────────────────────────────────────────────

/// Stateless entry points for the analysis stage.
pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    /// Row count, schema, and the first and last `n` rows. An empty table
    /// yields zero counts and no preview rows.
    pub fn overview(dataset: &MotorDataset, n: usize) -> DatasetOverview {
        let columns = Field::ALL
            .iter()
            .map(|&field| ColumnInfo {
                field,
                non_null: dataset
                    .readings()
                    .iter()
                    .filter(|r| !r.value(field).is_nan())
                    .count(),
                dtype: if field == Field::Profile { "u32" } else { "f64" },
            })
            .collect();
        DatasetOverview {
            rows: dataset.len(),
            columns,
            head: dataset.head(n).to_vec(),
            tail: dataset.tail(n).to_vec(),
        }
    }

    /// `describe()` for every column, one row per column. Columns of an empty
    /// table have a zero count and NaN figures.
    pub fn describe(dataset: &MotorDataset) -> Vec<ColumnDescription> {
        Field::ALL
            .iter()
            .map(|&field| ColumnDescription {
                field,
                summary: ColumnSummary::describe(&dataset.column(field)),
            })
            .collect()
    }

    /// Correlate the sensor columns and rank them against rotor temperature.
    ///
    /// Fails with `EmptyDataset`: there is nothing to correlate.
    pub fn correlations(dataset: &MotorDataset) -> Result<CorrelationReport> {
        dataset.require_rows()?;
        let matrix = CorrelationMatrix::compute(dataset, &Field::MEASUREMENTS);
        let pm_ranking = matrix.ranking(Field::Pm);
        let top_pm: Vec<(Field, f64)> = matrix
            .ranking_without_self(Field::Pm)
            .into_iter()
            .take(TOP_CORRELATIONS)
            .collect();
        debug!(
            "DatasetAnalyzer: {}x{} correlation matrix",
            matrix.len(),
            matrix.len()
        );
        Ok(CorrelationReport {
            matrix,
            pm_ranking,
            top_pm,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
