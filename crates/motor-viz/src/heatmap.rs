//! Annotated correlation heatmap.
//!
//! Only the strict lower triangle is drawn: the matrix is symmetric and its
//! diagonal carries no information, so the upper triangle including the
//! diagonal is left blank. Each visible cell is filled with the `coolwarm`
//! colour of its coefficient and labelled with the value to two decimals.

use std::path::Path;

use motor_core::error::{MotorError, Result};
use motor_data::analyzer::CorrelationMatrix;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::charts::chart_err;
use crate::palette;

const HEATMAP_SIZE: (u32, u32) = (1400, 1000);
const LABEL_MARGIN: i32 = 170;
const COLORBAR_MARGIN: i32 = 160;
const TOP_MARGIN: i32 = 20;
const COLORBAR_WIDTH: i32 = 30;
const COLORBAR_STEPS: i32 = 100;

/// `true` for cells hidden from the heatmap.
pub fn is_masked(row: usize, col: usize) -> bool {
    col >= row
}

/// Cell annotation, e.g. `"0.87"`.
pub fn annotation(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Pixel geometry of the square grid inside the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapLayout {
    pub left: i32,
    pub top: i32,
    pub cell: i32,
    pub n: usize,
}

impl HeatmapLayout {
    /// Fit an `n` by `n` grid into an area of `(width, height)` pixels, leaving
    /// room for labels and the colour bar.
    pub fn fit(area: (u32, u32), n: usize) -> Self {
        let cells = n.max(1) as i32;
        let usable_w = area.0 as i32 - LABEL_MARGIN - COLORBAR_MARGIN;
        let usable_h = area.1 as i32 - TOP_MARGIN - LABEL_MARGIN;
        let cell = (usable_w.min(usable_h) / cells).max(1);
        Self {
            left: LABEL_MARGIN,
            top: TOP_MARGIN,
            cell,
            n,
        }
    }

    pub fn cell_rect(&self, row: usize, col: usize) -> [(i32, i32); 2] {
        let x0 = self.left + col as i32 * self.cell;
        let y0 = self.top + row as i32 * self.cell;
        [(x0, y0), (x0 + self.cell, y0 + self.cell)]
    }

    pub fn cell_center(&self, row: usize, col: usize) -> (i32, i32) {
        let [(x0, y0), _] = self.cell_rect(row, col);
        (x0 + self.cell / 2, y0 + self.cell / 2)
    }

    /// Right edge of the grid.
    pub fn right(&self) -> i32 {
        self.left + self.n as i32 * self.cell
    }

    /// Bottom edge of the grid.
    pub fn bottom(&self) -> i32 {
        self.top + self.n as i32 * self.cell
    }
}

/// Draw `matrix` as a masked, annotated heatmap into `path`.
pub fn render_heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    if matrix.is_empty() {
        return Err(MotorError::Chart("correlation matrix is empty".to_string()));
    }

    let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let area = root
        .titled("Correlation matrix heatmap", ("sans-serif", 30.0))
        .map_err(chart_err)?;

    let layout = HeatmapLayout::fit(area.dim_in_pixel(), matrix.len());
    let font_size = f64::from((layout.cell / 5).clamp(10, 18));
    let fields = matrix.fields();

    for row in 0..layout.n {
        for col in 0..layout.n {
            if is_masked(row, col) {
                continue;
            }
            let value = matrix.value(row, col);
            let fill = palette::coolwarm(value);
            area.draw(&Rectangle::new(layout.cell_rect(row, col), fill.filled()))
                .map_err(chart_err)?;
            area.draw(&Rectangle::new(layout.cell_rect(row, col), WHITE.stroke_width(1)))
                .map_err(chart_err)?;

            let style = ("sans-serif", font_size)
                .into_font()
                .color(&palette::text_color_on(fill))
                .pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(
                annotation(value),
                layout.cell_center(row, col),
                style,
            ))
            .map_err(chart_err)?;
        }
    }

    let label_style = ("sans-serif", 15.0).into_font().color(&BLACK);
    for (i, field) in fields.iter().enumerate() {
        let (_, cy) = layout.cell_center(i, 0);
        area.draw(&Text::new(
            field.code(),
            (layout.left - 8, cy),
            label_style.clone().pos(Pos::new(HPos::Right, VPos::Center)),
        ))
        .map_err(chart_err)?;

        let (cx, _) = layout.cell_center(0, i);
        area.draw(&Text::new(
            field.code(),
            (cx, layout.bottom() + 8),
            label_style
                .clone()
                .transform(FontTransform::Rotate90)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(chart_err)?;
    }

    draw_colorbar(&area, &layout)?;
    root.present().map_err(chart_err)?;
    Ok(())
}

/// Vertical `coolwarm` scale from 1.0 (top) to -1.0 (bottom).
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    layout: &HeatmapLayout,
) -> Result<()> {
    let x0 = layout.right() + 40;
    let x1 = x0 + COLORBAR_WIDTH;
    let height = layout.bottom() - layout.top;

    for step in 0..COLORBAR_STEPS {
        let y0 = layout.top + height * step / COLORBAR_STEPS;
        let y1 = layout.top + height * (step + 1) / COLORBAR_STEPS;
        let value = 1.0 - 2.0 * (step as f64 + 0.5) / COLORBAR_STEPS as f64;
        area.draw(&Rectangle::new(
            [(x0, y0), (x1, y1)],
            palette::coolwarm(value).filled(),
        ))
        .map_err(chart_err)?;
    }

    let style = ("sans-serif", 14.0)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (label, y) in [
        ("1.0", layout.top),
        ("0.0", layout.top + height / 2),
        ("-1.0", layout.bottom()),
    ] {
        area.draw(&Text::new(label, (x1 + 6, y), style.clone()))
            .map_err(chart_err)?;
    }
    Ok(())
}
