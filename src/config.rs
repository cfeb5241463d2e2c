use crate::chart::ChartOptions;
use crate::colors::{ColorMode, DEFAULT_PALETTE};
use crate::error::{ChartError, Result};
use crate::layout::Padding;
use crate::pattern::PatternParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Every user-adjustable chart parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub rows: u32,
    pub cols: u32,
    pub keep_aspect: bool,
    pub tones: u8,
    pub brightness: i32,
    pub invert: bool,
    pub show_guides: bool,
    pub guide_every: u32,
    pub color_mode: ColorMode,
    pub palette: String,
    pub show_legend: bool,
    pub padding: Padding,
    pub auto_pad_percent: u32,
    /// Tone index → `#RRGGBB`.
    pub tone_colors: BTreeMap<usize, String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            rows: 139,
            cols: 100,
            keep_aspect: true,
            tones: 4,
            brightness: 0,
            invert: false,
            show_guides: true,
            guide_every: 10,
            color_mode: ColorMode::Grayscale,
            palette: DEFAULT_PALETTE.to_string(),
            show_legend: true,
            padding: Padding::default(),
            auto_pad_percent: 10,
            tone_colors: BTreeMap::new(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(path: &Path, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| ChartError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| ChartError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(path, &json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data with string map keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn pattern_params(&self) -> PatternParams {
        PatternParams {
            rows: self.rows,
            cols: self.cols,
            tones: self.tones,
            padding: self.padding,
            keep_aspect: self.keep_aspect,
            invert: self.invert,
            brightness: self.brightness,
        }
        .clamped()
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            show_guides: self.show_guides,
            guide_every: self.guide_every.max(2),
            show_legend: self.show_legend,
            mode: self.color_mode,
        }
    }
}
