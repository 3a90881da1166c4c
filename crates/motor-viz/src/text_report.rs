//! Plain-text console reports.
//!
//! Every function returns the rendered block so callers decide where it goes;
//! the pipeline prints them to stdout in stage order.

use std::fmt::Write;

use motor_core::formatting::{format_number, format_value, with_unit, TextTable};
use motor_core::models::{Field, Reading};
use motor_data::aggregator::ProfileReport;
use motor_data::analyzer::{ColumnDescription, CorrelationReport, DatasetOverview};
use motor_data::cleaner::CleaningReport;
use motor_data::exporter::ExportSummary;

use crate::summaries::{OperationalSummary, TemperatureSummary, Trend};

fn section(title: &str) -> String {
    format!("\n--- {} ---\n", title)
}

fn readings_table(readings: &[Reading]) -> TextTable {
    let mut table = TextTable::new(Field::ALL.iter().map(|f| f.code()));
    for reading in readings {
        table.push_row(Field::ALL.iter().map(|&field| match field {
            Field::Profile => reading.profile_id.to_string(),
            _ => format_value(reading.value(field), 4),
        }));
    }
    table
}

// ── Cleaning and inspection ───────────────────────────────────────────────────

pub fn render_cleaning(report: &CleaningReport) -> String {
    let mut out = section("Data cleaning");
    let _ = writeln!(out, "Rows before cleaning: {}", format_number(report.rows_before as f64, 0));
    let _ = writeln!(out, "Rows after cleaning:  {}", format_number(report.rows_after as f64, 0));
    let _ = writeln!(out, "Rows removed:         {}", format_number(report.rows_dropped as f64, 0));
    let _ = writeln!(out, "Remaining non-finite values: {}", report.remaining_non_finite);
    out
}

/// Schema, first rows and last rows of the cleaned table.
pub fn render_overview(overview: &DatasetOverview) -> String {
    let mut out = section("Columns and data types (after cleaning)");
    let _ = writeln!(
        out,
        "{} rows, {} columns",
        format_number(overview.rows as f64, 0),
        overview.columns.len()
    );

    let mut schema = TextTable::new(["column", "non-null", "dtype"]);
    for info in &overview.columns {
        schema.push_row([
            info.field.code().to_string(),
            info.non_null.to_string(),
            info.dtype.to_string(),
        ]);
    }
    let _ = writeln!(out, "{}", schema);

    out.push_str(&section(&format!("First {} rows (after cleaning)", overview.head.len())));
    let _ = writeln!(out, "{}", readings_table(&overview.head));
    out.push_str(&section(&format!("Last {} rows (after cleaning)", overview.tail.len())));
    let _ = writeln!(out, "{}", readings_table(&overview.tail));
    out
}

// ── Analyzer ──────────────────────────────────────────────────────────────────

/// `describe()` table, one column per row.
pub fn render_description(rows: &[ColumnDescription]) -> String {
    let mut out = section("Descriptive statistics");
    let mut table =
        TextTable::new(["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
    for row in rows {
        let s = &row.summary;
        table.push_row([
            row.field.code().to_string(),
            s.count.to_string(),
            format_value(s.mean, 4),
            format_value(s.std, 4),
            format_value(s.min, 4),
            format_value(s.q25, 4),
            format_value(s.median, 4),
            format_value(s.q75, 4),
            format_value(s.max, 4),
        ]);
    }
    let _ = writeln!(out, "{}", table);
    out
}

pub fn render_profiles(report: &ProfileReport) -> String {
    let mut out = section("Test sessions (profile_id)");
    let ids: Vec<String> = report.profile_ids.iter().map(|id| id.to_string()).collect();
    let _ = writeln!(out, "Unique sessions: {}", report.session_count);
    let _ = writeln!(out, "Session ids: [{}]", ids.join(", "));

    let mut table = TextTable::new(["profile_id", "readings", "duration (s)"]);
    for d in &report.durations {
        table.push_row([
            d.profile_id.to_string(),
            format_number(d.readings as f64, 0),
            format_value(d.duration_seconds, 1),
        ]);
    }
    let _ = writeln!(out, "{}", table);

    let _ = writeln!(out, "Mean session duration: {}", with_unit(report.mean_duration, 2, "s"));
    let _ = writeln!(out, "Shortest session:      {}", with_unit(report.min_duration, 2, "s"));
    let _ = writeln!(out, "Longest session:       {}", with_unit(report.max_duration, 2, "s"));
    out
}

/// Full matrix, the `pm` column sorted, and the strongest `pm` correlations.
pub fn render_correlations(report: &CorrelationReport) -> String {
    let mut out = section("Correlation matrix");
    let fields = report.matrix.fields();

    let mut table = TextTable::new(std::iter::once("").chain(fields.iter().map(|f| f.code())));
    for (row, field) in fields.iter().enumerate() {
        let cells = (0..fields.len()).map(|col| format_value(report.matrix.value(row, col), 4));
        table.push_row(std::iter::once(field.code().to_string()).chain(cells));
    }
    let _ = writeln!(out, "{}", table);

    out.push_str(&section("Correlation with rotor temperature (pm)"));
    for (field, r) in &report.pm_ranking {
        let _ = writeln!(out, "  {:<16}{:>9}", field.code(), format_value(*r, 4));
    }

    let _ = writeln!(out, "\nStrongest correlations with pm:");
    for (rank, (field, r)) in report.top_pm.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", rank + 1, field.code(), format_value(*r, 4));
    }
    out
}

// ── Visualizer summaries ──────────────────────────────────────────────────────

pub fn render_temperature(summary: &TemperatureSummary) -> String {
    let mut out = section(&format!(
        "Temperature summary for profile {}",
        summary.profile_id
    ));
    for (field, stats) in &summary.stats {
        let _ = writeln!(
            out,
            "  {}: min={}, max={}, mean={}",
            field.code(),
            with_unit(stats.min, 2, field.unit()),
            with_unit(stats.max, 2, field.unit()),
            with_unit(stats.mean, 2, field.unit()),
        );
    }

    let _ = writeln!(
        out,
        "\n  Rotor temperature (pm): initial {}, final {}",
        with_unit(summary.initial_pm, 2, "°C"),
        with_unit(summary.final_pm, 2, "°C"),
    );
    let _ = writeln!(
        out,
        "  Peak rotor temperature: {} at {}",
        with_unit(summary.peak_pm, 2, "°C"),
        with_unit(summary.peak_time_seconds, 2, "s"),
    );
    let observation = match summary.trend {
        Trend::Increasing => format!(
            "rotor temperature increases significantly ({} net change)",
            with_unit(summary.net_change(), 2, "°C")
        ),
        Trend::Decreasing => format!(
            "rotor temperature decreases significantly ({} net change)",
            with_unit(summary.net_change(), 2, "°C")
        ),
        Trend::Stable => "rotor temperature stays relatively stable".to_string(),
    };
    let _ = writeln!(out, "  Trend: {} ({})", summary.trend, observation);
    out
}

pub fn render_operational(summary: &OperationalSummary) -> String {
    let mut out = section(&format!(
        "Operational summary for profile {}",
        summary.profile_id
    ));
    for (field, stats) in &summary.stats {
        let _ = writeln!(
            out,
            "  {}: min={}, max={}, mean={}",
            field.code(),
            format_value(stats.min, 2),
            format_value(stats.max, 2),
            format_value(stats.mean, 2),
        );
    }

    let _ = writeln!(
        out,
        "\n  Motor speed: mean {}, max {}",
        with_unit(summary.avg_speed, 2, "rpm"),
        with_unit(summary.max_speed, 2, "rpm"),
    );
    let _ = writeln!(
        out,
        "  Torque: mean {}, peak absolute {}",
        with_unit(summary.avg_torque, 2, "Nm"),
        with_unit(summary.peak_abs_torque, 2, "Nm"),
    );
    if summary.regenerative_braking {
        let _ = writeln!(
            out,
            "  Note: negative torque observed, indicating braking or energy regeneration."
        );
    }
    out
}

/// Colour legend and every other column's correlation with `pm`.
pub fn render_heatmap_summary(pm_correlations: &[(Field, f64)]) -> String {
    let mut out = section("Correlation heatmap summary");
    out.push_str("Warm (red) cells mark strong positive correlation.\n");
    out.push_str("Cool (blue) cells mark strong negative correlation.\n");
    out.push_str("Cells near white mark little or no linear correlation.\n");
    let _ = writeln!(out, "\nCorrelations with rotor temperature (pm):");
    for (field, r) in pm_correlations {
        let _ = writeln!(out, "  - {}: {}", field.code(), format_value(*r, 4));
    }
    out
}

pub fn render_export(summary: &ExportSummary) -> String {
    let mut out = section("Export");
    let _ = writeln!(
        out,
        "Wrote {} rows x {} columns to '{}' ({})",
        format_number(summary.rows as f64, 0),
        summary.columns,
        summary.path.display(),
        summary.format
    );
    out
}
