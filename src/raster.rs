//! Raster drawing surface backed by an `image::RgbImage`.

use crate::chart::ChartCanvas;
use crate::colors::Rgb;
use crate::glyphs::{glyph, text_cells, GLYPH_ADVANCE, GLYPH_ROWS};
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub struct RasterCanvas {
    image: RgbImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width.max(1), height.max(1), image::Rgb([255, 255, 255])),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Fill the pixel span `[x0, x1) x [y0, y1)`, always at least one pixel wide and tall.
    fn fill_span(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let left = x0.round() as i32;
        let top = y0.round() as i32;
        let w = ((x1.round() as i32) - left).max(1) as u32;
        let h = ((y1.round() as i32) - top).max(1) as u32;
        draw_filled_rect_mut(&mut self.image, Rect::at(left, top).of_size(w, h), to_pixel(color));
    }
}

fn to_pixel(color: Rgb) -> image::Rgb<u8> {
    image::Rgb([color.red, color.green, color.blue])
}

impl ChartCanvas for RasterCanvas {
    fn size(&self) -> (f32, f32) {
        (self.image.width() as f32, self.image.height() as f32)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.fill_span(x, y, x + w, y + h, color);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        let half = width.max(1.0) * 0.5;
        if from.0 == to.0 {
            let (y0, y1) = (from.1.min(to.1), from.1.max(to.1));
            self.fill_span(from.0 - half, y0 - half, from.0 + half, y1 + half, color);
        } else if from.1 == to.1 {
            let (x0, x1) = (from.0.min(to.0), from.0.max(to.0));
            self.fill_span(x0 - half, from.1 - half, x1 + half, from.1 + half, color);
        } else {
            draw_line_segment_mut(&mut self.image, from, to, to_pixel(color));
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, color: Rgb) {
        let scale = size / GLYPH_ROWS as f32;
        let mut x_cursor = x;
        for ch in text.chars() {
            let bits = glyph(ch).or_else(|| glyph('?'));
            if let Some(bits) = bits {
                for (row, row_bits) in bits.iter().enumerate() {
                    for (col, bit) in row_bits.as_bytes().iter().enumerate() {
                        if *bit != b'1' {
                            continue;
                        }
                        let px = x_cursor + col as f32 * scale;
                        let py = y + row as f32 * scale;
                        self.fill_span(px, py, px + scale, py + scale, color);
                    }
                }
            }
            x_cursor += GLYPH_ADVANCE as f32 * scale;
        }
    }

    fn text_width(&self, size: f32, text: &str) -> f32 {
        text_cells(text) as f32 * size / GLYPH_ROWS as f32
    }

    fn hairline(&self) -> f32 {
        1.0
    }

    fn min_text_size(&self) -> f32 {
        GLYPH_ROWS as f32
    }
}
