//! Per-session line charts rendered to PNG with `plotters`.

use std::ops::Range;
use std::path::Path;

use motor_core::error::{MotorError, Result};
use motor_core::models::{Field, ProfileId, Reading};
use plotters::prelude::*;

use crate::palette::{self, LineKind};

const CHART_SIZE: (u32, u32) = (1200, 600);
const LINE_WIDTH: u32 = 2;

/// Which chart to draw and the columns plotted against elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineChart {
    pub kind: ChartKind,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Temperatures,
    SpeedTorque,
    CurrentsVoltages,
}

impl ChartKind {
    /// PNG file name, e.g. `profile_11_temperatures.png`.
    pub fn file_name(self, profile_id: ProfileId) -> String {
        let suffix = match self {
            ChartKind::Temperatures => "temperatures",
            ChartKind::SpeedTorque => "speed_torque",
            ChartKind::CurrentsVoltages => "currents_voltages",
        };
        format!("profile_{}_{}.png", profile_id, suffix)
    }

    fn title(self, profile_id: ProfileId) -> String {
        match self {
            ChartKind::Temperatures => format!("Temperature trends for profile {}", profile_id),
            ChartKind::SpeedTorque => format!("Motor speed and torque for profile {}", profile_id),
            ChartKind::CurrentsVoltages => {
                format!("Control currents and voltages for profile {}", profile_id)
            }
        }
    }

    fn y_label(self) -> &'static str {
        match self {
            ChartKind::Temperatures => "temperature (°C)",
            ChartKind::SpeedTorque | ChartKind::CurrentsVoltages => "value",
        }
    }
}

pub const TEMPERATURE_CHART: LineChart = LineChart {
    kind: ChartKind::Temperatures,
    fields: &Field::TEMPERATURES,
};

pub const SPEED_TORQUE_CHART: LineChart = LineChart {
    kind: ChartKind::SpeedTorque,
    fields: &[Field::MotorSpeed, Field::Torque],
};

pub const CURRENTS_VOLTAGES_CHART: LineChart = LineChart {
    kind: ChartKind::CurrentsVoltages,
    fields: &[
        Field::CurrentD,
        Field::CurrentQ,
        Field::VoltageD,
        Field::VoltageQ,
    ],
};

/// Draw `chart` for one session's readings into `path`.
pub fn render_line_chart(
    path: &Path,
    chart: LineChart,
    profile_id: ProfileId,
    readings: &[&Reading],
) -> Result<()> {
    let elapsed: Vec<f64> = readings.iter().map(|r| r.elapsed_seconds).collect();
    let values: Vec<f64> = chart
        .fields
        .iter()
        .flat_map(|&field| readings.iter().map(move |r| r.value(field)))
        .collect();
    let x_range = axis_range(&elapsed);
    let y_range = axis_range(&values);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.kind.title(profile_id), ("sans-serif", 26.0))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    ctx.configure_mesh()
        .x_desc("time (seconds)")
        .y_desc(chart.kind.y_label())
        .draw()
        .map_err(chart_err)?;

    for &field in chart.fields {
        let style = palette::series_style(field);
        let color = style.color;
        let stroke = color.stroke_width(LINE_WIDTH);
        let points: Vec<(f64, f64)> = readings
            .iter()
            .map(|r| (r.elapsed_seconds, r.value(field)))
            .filter(|(_, y)| y.is_finite())
            .collect();
        let legend = move |(x, y): (i32, i32)| {
            PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(LINE_WIDTH))
        };

        match style.kind.dash_pattern() {
            None => {
                ctx.draw_series(LineSeries::new(points, stroke))
                    .map_err(chart_err)?
                    .label(legend_label(field, style.kind))
                    .legend(legend);
            }
            Some((size, spacing)) => {
                ctx.draw_series(DashedLineSeries::new(points, size, spacing, stroke))
                    .map_err(chart_err)?
                    .label(legend_label(field, style.kind))
                    .legend(legend);
            }
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Legend icons are solid, so broken lines say so in their label.
fn legend_label(field: Field, kind: LineKind) -> String {
    match kind {
        LineKind::Solid => field.export_label().to_string(),
        LineKind::Dashed => format!("{} (dashed)", field.export_label()),
        LineKind::Dotted => format!("{} (dotted)", field.export_label()),
    }
}

/// Finite min..max padded by 5 %; a flat or empty series gets a unit band.
pub fn axis_range(values: &[f64]) -> Range<f64> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

pub(crate) fn chart_err<E: std::fmt::Display>(e: E) -> MotorError {
    MotorError::Chart(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            ChartKind::Temperatures.file_name(ProfileId(11)),
            "profile_11_temperatures.png"
        );
        assert_eq!(
            ChartKind::SpeedTorque.file_name(ProfileId(6)),
            "profile_6_speed_torque.png"
        );
        assert_eq!(
            ChartKind::CurrentsVoltages.file_name(ProfileId(29)),
            "profile_29_currents_voltages.png"
        );
    }

    #[test]
    fn test_chart_columns() {
        assert_eq!(TEMPERATURE_CHART.fields.len(), 6);
        assert_eq!(TEMPERATURE_CHART.fields[0], Field::Pm);
        assert_eq!(SPEED_TORQUE_CHART.fields, &[Field::MotorSpeed, Field::Torque]);
        assert!(CURRENTS_VOLTAGES_CHART.fields.contains(&Field::VoltageQ));
    }

    #[test]
    fn test_axis_range() {
        let r = axis_range(&[0.0, 10.0]);
        assert!((r.start + 0.5).abs() < 1e-12);
        assert!((r.end - 10.5).abs() < 1e-12);

        assert_eq!(axis_range(&[3.0, 3.0]), 2.0..4.0);
        assert_eq!(axis_range(&[]), 0.0..1.0);
        assert_eq!(axis_range(&[f64::NAN, 5.0, f64::INFINITY]), 4.0..6.0);
    }

    #[test]
    fn test_legend_label_marks_broken_lines() {
        assert_eq!(legend_label(Field::Torque, LineKind::Dashed), "torque in Nm (dashed)");
        assert_eq!(legend_label(Field::Pm, LineKind::Solid), "rotor temperature in °C");
    }

    fn session(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.5;
                Reading {
                    u_q: 10.0 * t.sin(),
                    coolant: 18.0 + 0.1 * t,
                    stator_winding: 25.0 + 3.0 * t,
                    u_d: -5.0 * t.cos(),
                    stator_tooth: 24.0 + 2.5 * t,
                    motor_speed: 1500.0 + 100.0 * t,
                    i_d: -1.5 * t,
                    i_q: 0.8 * t,
                    pm: 40.0 + 2.0 * t,
                    stator_yoke: 23.0 + 2.0 * t,
                    ambient: 20.0,
                    torque: 5.0 - 2.0 * t,
                    profile_id: ProfileId(11),
                    elapsed_seconds: t,
                }
            })
            .collect()
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).expect("chart written");
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", path.display());
    }

    #[test]
    fn test_render_every_line_chart() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let readings = session(12);
        let refs: Vec<&Reading> = readings.iter().collect();

        for chart in [TEMPERATURE_CHART, SPEED_TORQUE_CHART, CURRENTS_VOLTAGES_CHART] {
            let path = tmp.path().join(chart.kind.file_name(ProfileId(11)));
            render_line_chart(&path, chart, ProfileId(11), &refs).expect("render");
            assert_png(&path);
        }
    }

    #[test]
    fn test_render_single_reading_session() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let readings = session(1);
        let refs: Vec<&Reading> = readings.iter().collect();
        let path = tmp.path().join("single.png");

        render_line_chart(&path, TEMPERATURE_CHART, ProfileId(11), &refs).expect("render");
        assert_png(&path);
    }

    #[test]
    fn test_render_into_missing_directory_fails() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let readings = session(4);
        let refs: Vec<&Reading> = readings.iter().collect();
        let path = tmp.path().join("absent").join("chart.png");

        let result = render_line_chart(&path, SPEED_TORQUE_CHART, ProfileId(11), &refs);
        assert!(matches!(result, Err(MotorError::Chart(_))));
        assert!(!path.exists());
    }
}

