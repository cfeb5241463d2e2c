//! Pattern construction: pad, resize, adjust, quantize.

use crate::layout::{fit, Padding, MIN_GRID};
use crate::quantize::quantize;
use image::imageops::{resize, FilterType};
use image::GrayImage;
use std::time::Instant;

pub const MIN_TONES: u8 = 2;
pub const MAX_TONES: u8 = 10;
pub const MAX_BRIGHTNESS: i32 = 100;

/// Inputs of a single pattern build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternParams {
    pub rows: u32,
    pub cols: u32,
    pub tones: u8,
    pub padding: Padding,
    pub keep_aspect: bool,
    pub invert: bool,
    pub brightness: i32,
}

impl PatternParams {
    /// Same parameters with every value pulled into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            rows: self.rows.max(MIN_GRID),
            cols: self.cols.max(MIN_GRID),
            tones: clamp_tones(self.tones),
            padding: self.padding,
            keep_aspect: self.keep_aspect,
            invert: self.invert,
            brightness: self.brightness.clamp(-MAX_BRIGHTNESS, MAX_BRIGHTNESS),
        }
    }
}

pub fn clamp_tones(tones: u8) -> u8 {
    tones.clamp(MIN_TONES, MAX_TONES)
}

/// A `rows x cols` grid of tone indices, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneGrid {
    rows: u32,
    cols: u32,
    tones: u8,
    cells: Vec<u8>,
}

impl ToneGrid {
    /// Wrap an existing row-major buffer. Returns `None` when the sizes disagree
    /// or a cell is outside `0..tones`.
    pub fn from_cells(rows: u32, cols: u32, tones: u8, cells: Vec<u8>) -> Option<Self> {
        if cells.len() != rows as usize * cols as usize || cells.iter().any(|&t| t >= tones) {
            return None;
        }
        Some(Self {
            rows,
            cols,
            tones,
            cells,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn tones(&self) -> u8 {
        self.tones
    }

    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells
            .get(row as usize * self.cols as usize + col as usize)
            .copied()
    }

    /// Rows from top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.cols.max(1) as usize)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of stitches per tone, indexed by tone.
    pub fn stitch_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.tones as usize];
        for &tone in &self.cells {
            counts[tone as usize] += 1;
        }
        counts
    }
}

fn adjust(value: u8, invert: bool, brightness: i32) -> u8 {
    let mut v = value as i32;
    if invert {
        v = 255 - v;
    }
    (v + brightness).clamp(0, 255) as u8
}

/// Build the tone grid for `source`, or `None` when there is no source image.
///
/// Padding stays at luminance 0, so it always quantizes to the darkest tone.
pub fn build_pattern(source: Option<&GrayImage>, params: &PatternParams) -> Option<ToneGrid> {
    let source = source?;
    let start = Instant::now();
    let params = params.clamped();

    let placement = fit(
        params.rows,
        params.cols,
        &params.padding,
        params.keep_aspect,
        source.width(),
        source.height(),
    );

    let small = resize(
        source,
        placement.new_w,
        placement.new_h,
        FilterType::Nearest,
    );

    let cols = params.cols as usize;
    let rows = params.rows as usize;
    let mut canvas = vec![0u8; rows * cols];

    // Anything pushed past the grid edge by oversized padding is dropped.
    for (x, y, pixel) in small.enumerate_pixels() {
        let cx = (placement.off_x + x) as usize;
        let cy = (placement.off_y + y) as usize;
        if cx >= cols || cy >= rows {
            continue;
        }
        canvas[cy * cols + cx] = adjust(pixel.0[0], params.invert, params.brightness);
    }

    let cells = quantize(&canvas, params.tones);

    log::debug!(
        "Pattern built: {}x{} stitches, image {}x{} at ({}, {}), {} tones, {}us",
        params.cols,
        params.rows,
        placement.new_w,
        placement.new_h,
        placement.off_x,
        placement.off_y,
        params.tones,
        start.elapsed().as_micros()
    );

    Some(ToneGrid {
        rows: params.rows,
        cols: params.cols,
        tones: params.tones,
        cells,
    })
}
