mod glyphs;
mod pdf_export;
mod quantize;
mod raster;

pub mod chart;
pub mod cli;
pub mod colors;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod pattern;
pub mod session;

pub use chart::{ChartCanvas, ChartOptions};
pub use colors::{ColorMode, Rgb, ToneOverrides};
pub use config::ChartConfig;
pub use error::{ChartError, Result};
pub use export::ExportFormat;
pub use layout::{Padding, Placement};
pub use pattern::{build_pattern, PatternParams, ToneGrid};
pub use pdf_export::PdfCanvas;
pub use quantize::{bin_edges, quantize, quantize_value};
pub use raster::RasterCanvas;
pub use session::{ExportOutcome, Preview, Session};

use clap::Parser;
use std::process::ExitCode;

pub fn run() -> ExitCode {
    cli::run(cli::CliArgs::parse())
}
