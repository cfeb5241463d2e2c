//! Chart geometry and drawing, independent of the output surface.
//!
//! Canvas coordinates have their origin at the top-left corner with y growing
//! downward; backends that use a different convention flip internally.

use crate::colors::{label_color, ColorMode, Rgb};
use crate::pattern::ToneGrid;

const WHITE: Rgb = Rgb::new(255, 255, 255);
const BLACK: Rgb = Rgb::new(0, 0, 0);
const GRID_LIGHT: Rgb = Rgb::new(255, 255, 255);
const GRID_DARK: Rgb = Rgb::new(77, 77, 77);

pub const PLACEHOLDER_TEXT: &str = "Open an image to generate a pattern.";

/// A drawing surface the chart can be rendered onto.
pub trait ChartCanvas {
    /// Width and height in canvas units.
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb);

    /// Draw `text` with its top-left corner at `(x, y)`; `size` is the cap height.
    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, color: Rgb);

    fn text_width(&self, size: f32, text: &str) -> f32;

    /// Thinnest line the surface can show.
    fn hairline(&self) -> f32;

    /// Smallest legible cap height.
    fn min_text_size(&self) -> f32 {
        0.0
    }
}

/// Display options that do not change the pattern itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub show_guides: bool,
    pub guide_every: u32,
    pub show_legend: bool,
    pub mode: ColorMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            show_guides: true,
            guide_every: 10,
            show_legend: true,
            mode: ColorMode::Grayscale,
        }
    }
}

pub fn chart_title(grid: &ToneGrid, mode: ColorMode) -> String {
    format!(
        "Crochet Grid Pattern ({} x {}, {} tones, {}) - Row numbers: 1 bottom, {} top",
        grid.cols(),
        grid.rows(),
        grid.tones(),
        mode.label(),
        grid.rows()
    )
}

/// Where everything goes on a canvas of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub unit: f32,
    pub cell: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub grid_width: f32,
    pub grid_height: f32,
    pub title_size: f32,
    pub title_y: f32,
    pub label_size: f32,
    pub label_step: u32,
    pub legend_x: f32,
}

impl ChartLayout {
    pub fn new(canvas: &dyn ChartCanvas, grid: &ToneGrid, options: &ChartOptions) -> Self {
        let (width, height) = canvas.size();
        let rows = grid.rows().max(1);
        let cols = grid.cols().max(1);

        let unit = width.min(height) / 100.0;
        let margin = 2.0 * unit;
        let title_band = 4.0 * unit;
        let legend_w = if options.show_legend { 12.0 * unit } else { 0.0 };

        let min_text = canvas.min_text_size();
        let nominal_label = (1.1 * unit).max(min_text);
        let gutter = canvas.text_width(nominal_label, &rows.to_string()) + unit;

        let avail_w = (width - 2.0 * margin - gutter - legend_w).max(1.0);
        let avail_h = (height - 2.0 * margin - title_band).max(1.0);
        let cell = (avail_w / cols as f32).min(avail_h / rows as f32);
        let grid_width = cell * cols as f32;
        let grid_height = cell * rows as f32;
        let origin_x = margin + gutter + (avail_w - grid_width) * 0.5;
        let origin_y = margin + title_band + (avail_h - grid_height) * 0.5;

        // Row numbers shrink to fit their row before any rows go unlabelled.
        let label_size = nominal_label.min(cell * 0.8).max(min_text);

        let title_size = 1.5 * unit;
        let title_y = (origin_y - title_band * 0.5 - title_size * 0.5).max(margin * 0.5);

        Self {
            unit,
            cell,
            origin_x,
            origin_y,
            grid_width,
            grid_height,
            title_size,
            title_y,
            label_size,
            label_step: row_label_step(cell, label_size),
            legend_x: origin_x + grid_width + 1.5 * unit,
        }
    }

    /// Top-left corner of a cell, row 0 at the top.
    pub fn cell_top_left(&self, row: u32, col: u32) -> (f32, f32) {
        (
            self.origin_x + col as f32 * self.cell,
            self.origin_y + row as f32 * self.cell,
        )
    }
}

/// Label every `step`-th row so neighbouring numbers never overlap.
fn row_label_step(cell: f32, label_size: f32) -> u32 {
    const STEPS: [u32; 9] = [1, 2, 5, 10, 20, 50, 100, 200, 500];
    let needed = label_size * 1.2;
    STEPS
        .iter()
        .copied()
        .find(|&step| step as f32 * cell >= needed)
        .unwrap_or(1000)
}

/// Row numbers to print: 1, every multiple of `step`, and the top row.
/// A multiple too close to the top row is dropped in its favour.
pub fn row_labels(rows: u32, step: u32) -> Vec<u32> {
    let step = step.max(1);
    let mut labels: Vec<u32> = std::iter::once(1)
        .chain((step..=rows).step_by(step as usize).filter(|&n| n > 1))
        .filter(|&n| n <= rows)
        .collect();
    if labels.last() != Some(&rows) {
        if let Some(&last) = labels.last() {
            if last > 1 && rows - last < step.div_ceil(2) {
                labels.pop();
            }
        }
        labels.push(rows);
    }
    labels.dedup();
    labels
}

/// Draw the full chart: cells, gridlines, guides, row numbers, legend, title.
pub fn draw_chart(
    canvas: &mut dyn ChartCanvas,
    grid: &ToneGrid,
    colors: &[Rgb],
    options: &ChartOptions,
) -> ChartLayout {
    let layout = ChartLayout::new(canvas, grid, options);
    let (width, height) = canvas.size();
    canvas.fill_rect(0.0, 0.0, width, height, WHITE);

    draw_cells(canvas, grid, colors, &layout);
    draw_gridlines(canvas, grid, &layout);
    if options.show_guides && options.guide_every >= 2 {
        draw_guides(canvas, grid, options.guide_every, &layout);
    }
    draw_row_numbers(canvas, grid, &layout);
    if options.show_legend {
        draw_legend(canvas, grid, colors, &layout);
    }
    draw_title(canvas, &chart_title(grid, options.mode), &layout);

    layout
}

fn draw_cells(canvas: &mut dyn ChartCanvas, grid: &ToneGrid, colors: &[Rgb], layout: &ChartLayout) {
    for (row, tones) in grid.iter_rows().enumerate() {
        for (col, &tone) in tones.iter().enumerate() {
            let color = colors.get(tone as usize).copied().unwrap_or(BLACK);
            let (x, y) = layout.cell_top_left(row as u32, col as u32);
            canvas.fill_rect(x, y, layout.cell, layout.cell, color);
        }
    }
}

fn vertical(canvas: &mut dyn ChartCanvas, layout: &ChartLayout, col: u32, width: f32, color: Rgb) {
    let x = layout.origin_x + col as f32 * layout.cell;
    canvas.stroke_line(
        (x, layout.origin_y),
        (x, layout.origin_y + layout.grid_height),
        width,
        color,
    );
}

fn horizontal(
    canvas: &mut dyn ChartCanvas,
    layout: &ChartLayout,
    row: u32,
    width: f32,
    color: Rgb,
) {
    let y = layout.origin_y + row as f32 * layout.cell;
    canvas.stroke_line(
        (layout.origin_x, y),
        (layout.origin_x + layout.grid_width, y),
        width,
        color,
    );
}

/// A light line under a darker, thinner one keeps borders visible on any tone.
fn draw_gridlines(canvas: &mut dyn ChartCanvas, grid: &ToneGrid, layout: &ChartLayout) {
    let hairline = canvas.hairline();
    let light = (layout.cell * 0.14).max(2.0 * hairline);
    let dark = (layout.cell * 0.06).max(hairline);

    for (width, color) in [(light, GRID_LIGHT), (dark, GRID_DARK)] {
        for col in 0..=grid.cols() {
            vertical(canvas, layout, col, width, color);
        }
        for row in 0..=grid.rows() {
            horizontal(canvas, layout, row, width, color);
        }
    }
}

fn draw_guides(canvas: &mut dyn ChartCanvas, grid: &ToneGrid, every: u32, layout: &ChartLayout) {
    let width = (layout.cell * 0.22).max(2.5 * canvas.hairline());
    for col in (0..=grid.cols()).step_by(every as usize) {
        vertical(canvas, layout, col, width, BLACK);
    }
    for row in (0..=grid.rows()).step_by(every as usize) {
        horizontal(canvas, layout, row, width, BLACK);
    }
}

/// Numbers increase upward: the bottom row is 1, the top row is `rows`.
fn draw_row_numbers(canvas: &mut dyn ChartCanvas, grid: &ToneGrid, layout: &ChartLayout) {
    let rows = grid.rows();
    for number in row_labels(rows, layout.label_step) {
        let row = rows - number;
        let text = number.to_string();
        let text_w = canvas.text_width(layout.label_size, &text);
        let x = layout.origin_x - layout.unit * 0.6 - text_w;
        let y = layout.origin_y + (row as f32 + 0.5) * layout.cell - layout.label_size * 0.5;
        canvas.text(x, y, layout.label_size, &text, BLACK);
    }
}

fn draw_legend(
    canvas: &mut dyn ChartCanvas,
    grid: &ToneGrid,
    colors: &[Rgb],
    layout: &ChartLayout,
) {
    let unit = layout.unit;
    let tones = grid.tones().max(1) as f32;
    let header = 1.2 * unit;
    canvas.text(layout.legend_x, layout.origin_y, header, "Tone", BLACK);

    let top = layout.origin_y + header * 2.0;
    let available = (layout.grid_height - header * 2.0).max(unit);
    let swatch = (3.0 * unit).min(available / tones * 0.8).max(unit * 0.5);
    let pitch = (available / tones).min(swatch * 1.4);
    let label_size = (swatch * 0.55).max(canvas.min_text_size());
    let count_size = unit.max(canvas.min_text_size());
    let hairline = canvas.hairline();

    let counts = grid.stitch_counts();
    for tone in 0..grid.tones() {
        let color = colors.get(tone as usize).copied().unwrap_or(BLACK);
        let y = top + tone as f32 * pitch;
        let x = layout.legend_x;
        canvas.fill_rect(x, y, swatch, swatch, color);
        for (from, to) in [
            ((x, y), (x + swatch, y)),
            ((x + swatch, y), (x + swatch, y + swatch)),
            ((x + swatch, y + swatch), (x, y + swatch)),
            ((x, y + swatch), (x, y)),
        ] {
            canvas.stroke_line(from, to, hairline, BLACK);
        }

        let index = tone.to_string();
        let index_w = canvas.text_width(label_size, &index);
        canvas.text(
            x + (swatch - index_w) * 0.5,
            y + (swatch - label_size) * 0.5,
            label_size,
            &index,
            label_color(color),
        );

        let count = format!("{} st", counts.get(tone as usize).copied().unwrap_or(0));
        canvas.text(
            x + swatch + unit * 0.6,
            y + (swatch - count_size) * 0.5,
            count_size,
            &count,
            BLACK,
        );
    }
}

fn draw_title(canvas: &mut dyn ChartCanvas, title: &str, layout: &ChartLayout) {
    let (width, _) = canvas.size();
    let max_w = width - 4.0 * layout.unit;
    let mut size = layout.title_size;
    let text_w = canvas.text_width(size, title);
    if text_w > max_w && text_w > 0.0 {
        size *= max_w / text_w;
    }
    let text_w = canvas.text_width(size, title);
    canvas.text((width - text_w) * 0.5, layout.title_y, size, title, BLACK);
}

/// Empty-state prompt shown before an image is loaded.
pub fn draw_placeholder(canvas: &mut dyn ChartCanvas) {
    let (width, height) = canvas.size();
    canvas.fill_rect(0.0, 0.0, width, height, WHITE);
    let size = (width.min(height) / 50.0).max(canvas.min_text_size());
    let text_w = canvas.text_width(size, PLACEHOLDER_TEXT);
    canvas.text(
        (width - text_w) * 0.5,
        (height - size) * 0.5,
        size,
        PLACEHOLDER_TEXT,
        BLACK,
    );
}
