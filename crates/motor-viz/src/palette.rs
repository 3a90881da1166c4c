use motor_core::models::Field;
use plotters::style::RGBColor;

/// Stroke pattern of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
}

impl LineKind {
    /// Dash length and gap in pixels; `None` for a continuous line.
    pub fn dash_pattern(self) -> Option<(u32, u32)> {
        match self {
            LineKind::Solid => None,
            LineKind::Dashed => Some((10, 6)),
            LineKind::Dotted => Some((2, 4)),
        }
    }
}

/// Colour and stroke of one plotted column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    pub kind: LineKind,
}

// ── Named colours ─────────────────────────────────────────────────────────────

pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const CYAN: RGBColor = RGBColor(0, 255, 255);
pub const GRAY: RGBColor = RGBColor(128, 128, 128);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const BROWN: RGBColor = RGBColor(165, 42, 42);
pub const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);
pub const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);

/// Fill for masked or undefined heatmap cells.
pub const MISSING: RGBColor = RGBColor(211, 211, 211);

/// Style used for `field` in the trend charts.
///
/// Torque is dashed and the two control voltages dotted so they stay readable
/// when they overlap the solid series.
pub fn series_style(field: Field) -> SeriesStyle {
    let (color, kind) = match field {
        Field::Pm => (RED, LineKind::Solid),
        Field::StatorWinding => (BLUE, LineKind::Solid),
        Field::StatorTooth => (GREEN, LineKind::Solid),
        Field::StatorYoke => (PURPLE, LineKind::Solid),
        Field::Coolant => (CYAN, LineKind::Solid),
        Field::Ambient => (GRAY, LineKind::Solid),
        Field::MotorSpeed => (ORANGE, LineKind::Solid),
        Field::Torque => (BROWN, LineKind::Dashed),
        Field::CurrentD => (DARK_GREEN, LineKind::Solid),
        Field::CurrentQ => (DARK_BLUE, LineKind::Solid),
        Field::VoltageD => (RED, LineKind::Dotted),
        Field::VoltageQ => (PURPLE, LineKind::Dotted),
        Field::Profile | Field::ElapsedSeconds => (GRAY, LineKind::Solid),
    };
    SeriesStyle { color, kind }
}

// ── Diverging colour map ──────────────────────────────────────────────────────

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Blue-white-red colour for a coefficient in [-1, 1].
///
/// Values outside the range are clamped; NaN maps to [`MISSING`].
pub fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return MISSING;
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (COOL, NEUTRAL, v + 1.0)
    } else {
        (NEUTRAL, WARM, v)
    };
    RGBColor(
        lerp(from.0, to.0, t),
        lerp(from.1, to.1, t),
        lerp(from.2, to.2, t),
    )
}

fn lerp(a: f64, b: f64, t: f64) -> u8 {
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance < 140.0 {
        RGBColor(255, 255, 255)
    } else {
        RGBColor(0, 0, 0)
    }
}
