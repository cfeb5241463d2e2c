//! The mutable editing state behind an interactive chart editor.
//!
//! Every setter clamps its input. Setters that change what gets stitched
//! rebuild the tone grid on the spot, so the pattern export writes always
//! matches the current parameters.

use crate::chart::ChartOptions;
use crate::colors::{parse_hex_color, resolve_colors, ColorMode, Rgb, ToneOverrides};
use crate::config::ChartConfig;
use crate::error::{ChartError, Result};
use crate::export::{export_chart, render_placeholder, render_preview, ExportFormat};
use crate::layout::{cols_for_rows, rows_for_cols, Padding, MAX_AUTO_PAD_PERCENT, MIN_GRID};
use crate::pattern::{build_pattern, clamp_tones, ToneGrid, MAX_BRIGHTNESS};
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};

/// What the canvas shows after a render.
#[derive(Debug, Clone)]
pub enum Preview {
    Chart(RgbImage),
    Placeholder(RgbImage),
}

impl Preview {
    pub fn image(&self) -> &RgbImage {
        match self {
            Preview::Chart(image) | Preview::Placeholder(image) => image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// No pattern exists yet; nothing was written.
    NothingToExport,
}

pub struct Session {
    config: ChartConfig,
    overrides: ToneOverrides,
    source: Option<GrayImage>,
    source_path: Option<PathBuf>,
    pattern: Option<ToneGrid>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl Session {
    /// Start a session from `config`. Tone colors that do not parse or do not
    /// fit the tone count are skipped with a warning.
    pub fn new(config: ChartConfig) -> Self {
        let mut session = Self {
            config: ChartConfig {
                tone_colors: Default::default(),
                ..config.clone()
            },
            overrides: ToneOverrides::default(),
            source: None,
            source_path: None,
            pattern: None,
        };
        session.config.rows = session.config.rows.max(MIN_GRID);
        session.config.cols = session.config.cols.max(MIN_GRID);
        session.config.tones = clamp_tones(session.config.tones);

        for (index, hex) in &config.tone_colors {
            let applied =
                parse_hex_color(hex).and_then(|color| session.set_tone_color(*index, color));
            if let Err(err) = applied {
                log::warn!("Ignoring tone color {} = {}: {}", index, hex, err);
            }
        }
        session
    }

    /// Current parameters, with tone overrides written back as hex strings.
    pub fn config(&self) -> ChartConfig {
        let mut config = self.config.clone();
        config.tone_colors = self
            .overrides
            .iter()
            .map(|(idx, color)| (idx, crate::colors::rgb_to_hex(color)))
            .collect();
        config
    }

    pub fn rows(&self) -> u32 {
        self.config.rows
    }

    pub fn cols(&self) -> u32 {
        self.config.cols
    }

    pub fn tones(&self) -> u8 {
        self.config.tones
    }

    pub fn overrides(&self) -> &ToneOverrides {
        &self.overrides
    }

    pub fn source(&self) -> Option<&GrayImage> {
        self.source.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// The tone grid for the current source and parameters.
    pub fn pattern(&self) -> Option<&ToneGrid> {
        self.pattern.as_ref()
    }

    /// Decode `path` as luminance. On failure nothing in the session changes.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        let decoded = image::open(path).map_err(|source| ChartError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_source(decoded.to_luma8(), Some(path.to_path_buf()));
        log::info!(
            "Loaded: {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(())
    }

    /// Install an already-decoded source image.
    pub fn set_source(&mut self, image: GrayImage, path: Option<PathBuf>) {
        self.source = Some(image);
        self.source_path = path;
        if self.config.keep_aspect {
            self.sync_cols_to_rows();
        }
        self.rebuild();
    }

    /// Recompute the tone grid from the source and current parameters.
    fn rebuild(&mut self) {
        self.pattern = build_pattern(self.source.as_ref(), &self.config.pattern_params());
    }

    fn source_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|img| img.dimensions())
    }

    fn sync_cols_to_rows(&mut self) {
        if let Some((w, h)) = self.source_size() {
            self.config.cols = cols_for_rows(self.config.rows, w, h);
        }
    }

    fn sync_rows_to_cols(&mut self) {
        if let Some((w, h)) = self.source_size() {
            self.config.rows = rows_for_cols(self.config.cols, w, h);
        }
    }

    /// Set the row count; under aspect lock the column count follows.
    pub fn set_rows(&mut self, rows: u32) {
        self.config.rows = rows.max(MIN_GRID);
        if self.config.keep_aspect {
            self.sync_cols_to_rows();
        }
        self.rebuild();
    }

    /// Set the column count; under aspect lock the row count follows.
    pub fn set_cols(&mut self, cols: u32) {
        self.config.cols = cols.max(MIN_GRID);
        if self.config.keep_aspect {
            self.sync_rows_to_cols();
        }
        self.rebuild();
    }

    pub fn set_aspect_lock(&mut self, keep_aspect: bool) {
        self.config.keep_aspect = keep_aspect;
        self.rebuild();
    }

    /// Change the tone count and drop overrides that no longer have a tone.
    pub fn set_tones(&mut self, tones: u8) {
        let tones = clamp_tones(tones);
        self.config.tones = tones;
        self.overrides.prune(tones);
        self.rebuild();
    }

    pub fn set_brightness(&mut self, offset: i32) {
        self.config.brightness = offset.clamp(-MAX_BRIGHTNESS, MAX_BRIGHTNESS);
        self.rebuild();
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.config.invert = invert;
        self.rebuild();
    }

    pub fn set_guides(&mut self, show: bool, every: u32) {
        self.config.show_guides = show;
        self.config.guide_every = every.max(2);
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.config.color_mode = mode;
    }

    pub fn set_palette(&mut self, name: &str) {
        self.config.palette = name.trim().to_string();
    }

    pub fn set_show_legend(&mut self, show: bool) {
        self.config.show_legend = show;
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.config.padding = padding;
        self.rebuild();
    }

    /// Equal padding on all sides from a percentage of the shorter dimension.
    pub fn apply_auto_padding(&mut self, percent: u32) -> Padding {
        let percent = percent.min(MAX_AUTO_PAD_PERCENT);
        self.config.auto_pad_percent = percent;
        self.config.padding = Padding::auto(self.config.rows, self.config.cols, percent);
        self.rebuild();
        self.config.padding
    }

    pub fn set_tone_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        self.overrides.set(index, color, self.config.tones)
    }

    pub fn reset_tone_color(&mut self, index: usize) -> Result<()> {
        self.overrides.reset(index, self.config.tones)
    }

    pub fn reset_all_colors(&mut self) {
        self.overrides.clear();
    }

    pub fn colors(&self) -> Vec<Rgb> {
        resolve_colors(
            self.config.tones,
            self.config.color_mode,
            &self.config.palette,
            &self.overrides,
        )
    }

    pub fn chart_options(&self) -> ChartOptions {
        self.config.chart_options()
    }

    /// Rebuild the pattern from the current parameters and draw it.
    pub fn render(&mut self) -> Preview {
        self.rebuild();
        match self.pattern.as_ref() {
            Some(grid) => {
                Preview::Chart(render_preview(grid, &self.colors(), &self.chart_options()))
            }
            None => Preview::Placeholder(render_placeholder()),
        }
    }

    /// Export the current pattern. Without a source image, nothing is written.
    pub fn export(&self, path: &Path, format: Option<ExportFormat>) -> Result<ExportOutcome> {
        let Some(grid) = self.pattern.as_ref() else {
            log::info!("Nothing to export: load an image and generate a pattern first.");
            return Ok(ExportOutcome::NothingToExport);
        };
        let format = format.unwrap_or_else(|| ExportFormat::from_path(path));
        export_chart(grid, &self.colors(), &self.chart_options(), path, format)?;
        log::info!("Exported pattern to: {}", path.display());
        Ok(ExportOutcome::Written(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn source(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([(x * 255 / width.max(1)) as u8]))
    }

    fn loaded(width: u32, height: u32) -> Session {
        let mut session = Session::default();
        session.set_source(source(width, height), None);
        session
    }

    #[test]
    fn rows_drive_cols_under_aspect_lock() {
        let mut session = loaded(200, 100);
        session.set_rows(50);
        assert_eq!(session.cols(), 100);

        session.set_padding(Padding::default());
        session.render();
        let grid = session.pattern().unwrap();
        assert_eq!((grid.rows(), grid.cols()), (50, 100));
    }

    #[test]
    fn cols_drive_rows_under_aspect_lock() {
        let mut session = loaded(200, 100);
        session.set_cols(60);
        assert_eq!(session.rows(), 30);
    }

    #[test]
    fn loading_syncs_cols_to_current_rows() {
        let session = loaded(300, 100);
        assert_eq!(session.rows(), 139);
        assert_eq!(session.cols(), 417);
    }

    #[test]
    fn unlocked_dimensions_are_independent() {
        let mut session = loaded(200, 100);
        session.set_aspect_lock(false);
        session.set_rows(40);
        session.set_cols(7);
        assert_eq!((session.rows(), session.cols()), (40, 7));
    }

    #[test]
    fn aspect_round_trip_is_stable() {
        let mut session = loaded(640, 480);
        session.set_rows(77);
        let cols = session.cols();

        session.set_aspect_lock(false);
        session.set_cols(cols);
        session.set_aspect_lock(true);
        session.set_cols(cols);
        assert!((session.rows() as i64 - 77).abs() <= 1);
        assert_eq!(session.cols(), cols);
    }

    #[test]
    fn dimensions_without_image_are_just_clamped() {
        let mut session = Session::default();
        session.set_rows(2);
        assert_eq!(session.rows(), MIN_GRID);
        assert_eq!(session.cols(), 100);
    }

    #[test]
    fn tone_change_prunes_overrides() {
        let mut session = Session::default();
        session.set_tones(8);
        for idx in [1, 4, 7] {
            session.set_tone_color(idx, Rgb::new(9, 9, 9)).unwrap();
        }
        session.set_tones(5);
        let kept: Vec<usize> = session.overrides().iter().map(|(i, _)| i).collect();
        assert_eq!(kept, vec![1, 4]);
        assert_eq!(session.colors().len(), 5);

        session.reset_all_colors();
        assert!(session.overrides().is_empty());
    }

    #[test]
    fn invalid_tone_index_changes_nothing() {
        let mut session = Session::default();
        session.set_tone_color(2, Rgb::new(1, 1, 1)).unwrap();
        let before = *session.overrides();

        assert!(matches!(
            session.set_tone_color(4, Rgb::new(0, 0, 0)),
            Err(ChartError::InvalidTone { index: 4, tones: 4 })
        ));
        assert!(session.reset_tone_color(9).is_err());
        assert_eq!(*session.overrides(), before);

        session.reset_tone_color(2).unwrap();
        assert!(session.overrides().is_empty());
    }

    #[test]
    fn tone_count_is_clamped() {
        let mut session = Session::default();
        session.set_tones(0);
        assert_eq!(session.tones(), 2);
        session.set_tones(200);
        assert_eq!(session.tones(), 10);
    }

    #[test]
    fn auto_padding_uses_clamped_percentage() {
        let mut session = Session::default();
        let padding = session.apply_auto_padding(10);
        assert_eq!(padding, Padding::uniform(10));
        session.apply_auto_padding(500);
        assert_eq!(session.config().auto_pad_percent, 90);
    }

    #[test]
    fn empty_session_renders_placeholder_and_exports_nothing() {
        let mut session = Session::default();
        assert!(matches!(session.render(), Preview::Placeholder(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let outcome = session.export(&path, None).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert!(!path.exists());
    }

    #[test]
    fn render_then_export_writes_file() {
        let mut session = loaded(40, 40);
        session.set_rows(20);
        assert!(matches!(session.render(), Preview::Chart(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.pdf");
        let outcome = session.export(&path, None).unwrap();
        assert_eq!(outcome, ExportOutcome::Written(path.clone()));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn export_follows_changes_made_after_render() {
        let mut session = Session::default();
        session.set_source(GrayImage::from_pixel(40, 40, Luma([255])), None);
        session.set_rows(20);
        session.render();
        assert_eq!(session.pattern().map(|g| g.tones()), Some(4));

        session.set_tones(2);
        assert_eq!(session.pattern().map(|g| g.tones()), Some(2));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        session.export(&path, None).unwrap();

        let grid = session.pattern().unwrap();
        let canvas = crate::raster::RasterCanvas::new(
            crate::export::EXPORT_WIDTH_PX,
            crate::export::EXPORT_HEIGHT_PX,
        );
        let layout = crate::chart::ChartLayout::new(&canvas, grid, &session.chart_options());
        let (x, y) = layout.cell_top_left(10, 10);
        let center = ((x + layout.cell * 0.5) as u32, (y + layout.cell * 0.5) as u32);

        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!(written.get_pixel(center.0, center.1).0, [255, 255, 255]);
    }

    #[test]
    fn new_source_replaces_pattern_without_render() {
        let mut session = Session::default();
        session.set_source(GrayImage::from_pixel(40, 40, Luma([255])), None);
        session.set_rows(20);
        assert!(session.pattern().unwrap().cells().iter().all(|&t| t == 3));

        session.set_source(GrayImage::from_pixel(40, 40, Luma([0])), None);
        assert!(session.pattern().unwrap().cells().iter().all(|&t| t == 0));

        session.set_invert(true);
        assert!(session.pattern().unwrap().cells().iter().all(|&t| t == 3));
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let mut session = loaded(200, 100);
        session.set_rows(50);
        session.render();
        let before = session.pattern().cloned();

        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not-an-image.png");
        std::fs::write(&bogus, b"definitely not a png").unwrap();

        let err = session.load_image(&bogus).unwrap_err();
        assert!(matches!(err, ChartError::ImageLoad { .. }));
        assert_eq!(session.source().map(|s| s.dimensions()), Some((200, 100)));
        assert_eq!((session.rows(), session.cols()), (50, 100));
        assert_eq!(session.pattern().cloned(), before);
    }

    #[test]
    fn load_image_converts_to_luminance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(30, 10, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let mut session = Session::default();
        session.load_image(&path).unwrap();
        assert_eq!(session.source().unwrap().get_pixel(0, 0).0, [255]);
        assert_eq!(session.cols(), 417);
        assert_eq!(session.source_path(), Some(path.as_path()));
    }

    #[test]
    fn config_carries_tone_colors_both_ways() {
        let mut config = ChartConfig::default();
        config.tone_colors.insert(1, "#FF0000".to_string());
        config.tone_colors.insert(7, "#00FF00".to_string());
        config.tone_colors.insert(2, "oops".to_string());

        let session = Session::new(config);
        assert_eq!(session.overrides().get(1), Some(Rgb::new(255, 0, 0)));
        assert_eq!(session.overrides().get(7), None);
        assert_eq!(session.overrides().get(2), None);
        assert_eq!(
            session.config().tone_colors.get(&1).map(String::as_str),
            Some("#FF0000")
        );
    }
}
