use unicode_width::UnicodeWidthStr;

/// Fixed-point rendering with comma-grouped thousands, used for row counts
/// and motor speeds in the console reports.
///
/// ```
/// use motor_core::formatting::format_number;
///
/// assert_eq!(format_number(998_070.0, 0), "998,070");
/// assert_eq!(format_number(4999.25, 2), "4,999.25");
/// assert_eq!(format_number(-1250.0, 1), "-1,250.0");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return format_value(value, decimals);
    }
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Fixed-point rendering without grouping; `NaN` and infinities are spelled
/// out instead of printed as digits.
///
/// ```
/// use motor_core::formatting::format_value;
///
/// assert_eq!(format_value(45.0, 2), "45.00");
/// assert_eq!(format_value(f64::NAN, 4), "NaN");
/// ```
pub fn format_value(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{:.prec$}", value, prec = decimals as usize)
    }
}

/// Value followed by its unit, e.g. `"45.00 °C"`; no trailing space when the
/// unit is empty.
pub fn with_unit(value: f64, decimals: u32, unit: &str) -> String {
    let rendered = format_value(value, decimals);
    if unit.is_empty() {
        rendered
    } else {
        format!("{} {}", rendered, unit)
    }
}

// ── TextTable ─────────────────────────────────────────────────────────────────

/// Plain-text table for console reports.
///
/// The first column is left-aligned, every other column right-aligned. Widths
/// are measured in terminal cells so labels such as `°C` line up.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells when rendered.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header, a dashed rule, then the rows.
    pub fn render(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut out = String::new();
        out.push_str(&render_line(&self.headers, &widths));
        out.push('\n');
        let rule_width = widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1);
        out.push_str(&"-".repeat(rule_width));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&render_line(row, &widths));
        }
        out
    }
}

impl std::fmt::Display for TextTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let rendered: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = " ".repeat(width.saturating_sub(cell.width()));
            if i == 0 {
                format!("{}{}", cell, pad)
            } else {
                format!("{}{}", pad, cell)
            }
        })
        .collect();
    rendered.join("  ").trim_end().to_string()
}

/// `"998070"` becomes `"998,070"`.
fn group_thousands(digits: &str) -> String {
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let (head, rest) = digits.split_at(lead.min(digits.len()));
    let mut grouped = head.to_string();
    for chunk in rest.as_bytes().chunks(3) {
        grouped.push(',');
        grouped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    grouped
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN, 2), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY, 2), "-inf");
    }

    // ── format_value / with_unit ─────────────────────────────────────────────

    #[test]
    fn test_format_value_fixed_point() {
        assert_eq!(format_value(0.5, 2), "0.50");
        assert_eq!(format_value(-12.3456, 4), "-12.3456");
        assert_eq!(format_value(f64::INFINITY, 1), "inf");
    }

    #[test]
    fn test_with_unit() {
        assert_eq!(with_unit(45.0, 2, "°C"), "45.00 °C");
        assert_eq!(with_unit(3.0, 0, ""), "3");
    }

    // ── TextTable ────────────────────────────────────────────────────────────

    #[test]
    fn test_text_table_alignment() {
        let mut table = TextTable::new(["column", "mean"]);
        table.push_row(["pm", "45.00"]);
        table.push_row(["stator_winding", "7.5"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "column           mean");
        assert_eq!(lines[2], "pm              45.00");
        assert_eq!(lines[3], "stator_winding    7.5");
        assert!(lines[1].chars().all(|c| c == '-'));
    }

    #[test]
    fn test_text_table_measures_display_width() {
        let mut table = TextTable::new(["unit", "x"]);
        table.push_row(["°C", "1"]);
        table.push_row(["rpm", "2"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2].width(), lines[3].width());
    }

    #[test]
    fn test_text_table_pads_short_rows() {
        let mut table = TextTable::new(["a", "b", "c"]);
        table.push_row(["x"]);
        assert_eq!(table.len(), 1);
        assert!(table.render().lines().nth(2).unwrap().starts_with('x'));
    }

    // ── grouping ─────────────────────────────────────────────────────────────

    #[test]
    fn test_group_thousands_four_digits() {
        assert_eq!(format_number(1234.0, 0), "1,234");
        assert_eq!(format_number(5.0, 0), "5");
    }
}
