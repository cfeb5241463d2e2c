//! Print-resolution export and the on-screen preview render.

use crate::chart::{draw_chart, draw_placeholder, ChartOptions};
use crate::colors::Rgb;
use crate::error::{ChartError, Result};
use crate::pattern::ToneGrid;
use crate::pdf_export::export_chart_pdf;
use crate::raster::RasterCanvas;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// US Letter at 300 dpi.
pub const EXPORT_WIDTH_PX: u32 = 2550;
pub const EXPORT_HEIGHT_PX: u32 = 3300;

/// The on-screen figure, 8.6 x 10.6 in at 100 dpi.
pub const PREVIEW_WIDTH_PX: u32 = 860;
pub const PREVIEW_HEIGHT_PX: u32 = 1060;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    /// `.pdf` selects PDF; anything else is written as PNG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => ExportFormat::Pdf,
            _ => ExportFormat::Png,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ChartError::InvalidArgument(format!(
                "Unsupported export format '{}', expected png or pdf",
                other
            ))),
        }
    }
}

fn render_raster(
    grid: &ToneGrid,
    colors: &[Rgb],
    options: &ChartOptions,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut canvas = RasterCanvas::new(width, height);
    draw_chart(&mut canvas, grid, colors, options);
    canvas.into_image()
}

pub fn render_preview(grid: &ToneGrid, colors: &[Rgb], options: &ChartOptions) -> RgbImage {
    render_raster(grid, colors, options, PREVIEW_WIDTH_PX, PREVIEW_HEIGHT_PX)
}

pub fn render_placeholder() -> RgbImage {
    let mut canvas = RasterCanvas::new(PREVIEW_WIDTH_PX, PREVIEW_HEIGHT_PX);
    draw_placeholder(&mut canvas);
    canvas.into_image()
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Serialize the chart in `format` at print resolution.
pub fn encode_chart(
    grid: &ToneGrid,
    colors: &[Rgb],
    options: &ChartOptions,
    format: ExportFormat,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Png => {
            let image = render_raster(grid, colors, options, EXPORT_WIDTH_PX, EXPORT_HEIGHT_PX);
            encode_png(&image)
        }
        ExportFormat::Pdf => Ok(export_chart_pdf(grid, colors, options)),
    }
}

/// Render and write the chart to `path`.
///
/// The rendered surface is dropped before the write, so nothing is held
/// after this returns whether or not the write succeeded.
pub fn export_chart(
    grid: &ToneGrid,
    colors: &[Rgb],
    options: &ChartOptions,
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    let contents = encode_chart(grid, colors, options, format)?;
    log::info!(
        "Exporting {}x{} chart as {} ({} bytes) to {}",
        grid.cols(),
        grid.rows(),
        format.extension(),
        contents.len(),
        path.display()
    );
    write_atomic(path, &contents)
}

/// Write through a temporary sibling and rename it into place, so a failed
/// write never leaves a partial file at `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let export_err = |source: std::io::Error| ChartError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("crochet-export"),
        stamp
    );
    let temp_path = path.with_file_name(temp_name);

    if let Err(err) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(export_err(err));
    }

    let renamed = fs::rename(&temp_path, path).or_else(|rename_err| {
        if path.is_file() {
            replace_existing(&temp_path, path)
        } else {
            Err(rename_err)
        }
    });
    if let Err(err) = renamed {
        let _ = fs::remove_file(&temp_path);
        return Err(export_err(err));
    }
    Ok(())
}

/// Move `temp` over an existing `path` where a plain rename cannot overwrite.
/// The old file is set aside until the new one is in place, and put back if
/// that fails.
fn replace_existing(temp: &Path, path: &Path) -> std::io::Result<()> {
    let backup = temp.with_extension("bak");
    fs::rename(path, &backup)?;
    match fs::rename(temp, path) {
        Ok(()) => {
            let _ = fs::remove_file(&backup);
            Ok(())
        }
        Err(err) => {
            let _ = fs::rename(&backup, path);
            Err(err)
        }
    }
}
