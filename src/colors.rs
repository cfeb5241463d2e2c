//! Tone → color resolution: grayscale ramps, named qualitative palettes, and
//! per-tone overrides.

use crate::error::{ChartError, Result};
use crate::pattern::MAX_TONES;
use palette::{white_point::D65, FromColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

pub type Rgb = Srgb<u8>;

pub const DEFAULT_PALETTE: &str = "tab10";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Grayscale,
    Palette,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Grayscale => "Grayscale",
            ColorMode::Palette => "Colors",
        }
    }
}

/// Qualitative palettes, each entry: (name, colors)
const QUALITATIVE_PALETTES: &[(&str, &[&str])] = &[
    (
        "tab10",
        &[
            "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2",
            "#7F7F7F", "#BCBD22", "#17BECF",
        ],
    ),
    (
        "tab20",
        &[
            "#1F77B4", "#AEC7E8", "#FF7F0E", "#FFBB78", "#2CA02C", "#98DF8A", "#D62728",
            "#FF9896", "#9467BD", "#C5B0D5", "#8C564B", "#C49C94", "#E377C2", "#F7B6D2",
            "#7F7F7F", "#C7C7C7", "#BCBD22", "#DBDB8D", "#17BECF", "#9EDAE5",
        ],
    ),
    (
        "Set1",
        &[
            "#E41A1C", "#377EB8", "#4DAF4A", "#984EA3", "#FF7F00", "#FFFF33", "#A65628",
            "#F781BF", "#999999",
        ],
    ),
    (
        "Set2",
        &[
            "#66C2A5", "#FC8D62", "#8DA0CB", "#E78AC3", "#A6D854", "#FFD92F", "#E5C494",
            "#B3B3B3",
        ],
    ),
    (
        "Set3",
        &[
            "#8DD3C7", "#FFFFB3", "#BEBADA", "#FB8072", "#80B1D3", "#FDB462", "#B3DE69",
            "#FCCDE5", "#D9D9D9", "#BC80BD", "#CCEBC5", "#FFED6F",
        ],
    ),
    (
        "Paired",
        &[
            "#A6CEE3", "#1F78B4", "#B2DF8A", "#33A02C", "#FB9A99", "#E31A1C", "#FDBF6F",
            "#FF7F00", "#CAB2D6", "#6A3D9A", "#FFFF99", "#B15928",
        ],
    ),
    (
        "Accent",
        &[
            "#7FC97F", "#BEAED4", "#FDC086", "#FFFF99", "#386CB0", "#F0027F", "#BF5B17",
            "#666666",
        ],
    ),
    (
        "Dark2",
        &[
            "#1B9E77", "#D95F02", "#7570B3", "#E7298A", "#66A61E", "#E6AB02", "#A6761D",
            "#666666",
        ],
    ),
    (
        "Pastel1",
        &[
            "#FBB4AE", "#B3CDE3", "#CCEBC5", "#DECBE4", "#FED9A6", "#FFFFCC", "#E5D8BD",
            "#FDDAEC", "#F2F2F2",
        ],
    ),
    (
        "Pastel2",
        &[
            "#B3E2CD", "#FDCDAC", "#CBD5E8", "#F4CAE4", "#E6F5C9", "#FFF2AE", "#F1E2CC",
            "#CCCCCC",
        ],
    ),
];

/// Names accepted by [`palette_colors`], in display order.
pub fn palette_names() -> impl Iterator<Item = &'static str> {
    QUALITATIVE_PALETTES.iter().map(|(name, _)| *name)
}

/// Resolve a palette by name. Unknown names fall back to `tab10`.
pub fn palette_colors(name: &str) -> &'static [&'static str] {
    let trimmed = name.trim();
    QUALITATIVE_PALETTES
        .iter()
        .find(|(n, _)| *n == trimmed)
        .or_else(|| {
            QUALITATIVE_PALETTES
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(trimmed))
        })
        .map(|(_, colors)| *colors)
        .unwrap_or_else(|| {
            log::debug!("Unknown palette '{}', using {}", name, DEFAULT_PALETTE);
            QUALITATIVE_PALETTES[0].1
        })
}

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<Rgb> {
    let normalized = hex.trim().trim_start_matches('#');
    if normalized.len() != 6 || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChartError::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&normalized[range], 16)
            .map_err(|_| ChartError::InvalidColor(hex.to_string()))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn rgb_to_hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Table entries are compile-time constants, so a bad one reads as mid gray
/// rather than failing a render.
fn table_color(hex: &str) -> Rgb {
    parse_hex_color(hex).unwrap_or(Rgb::new(166, 166, 166))
}

/// Sample `tones` colors evenly across a palette, first entry at 0, last at 1.
fn sample_palette(colors: &[&str], tones: u8) -> Vec<Rgb> {
    let n = colors.len();
    (0..tones as usize)
        .map(|k| {
            let x = if tones > 1 {
                k as f64 / (tones - 1) as f64
            } else {
                0.0
            };
            let idx = ((x * n as f64).floor() as usize).min(n - 1);
            table_color(colors[idx])
        })
        .collect()
}

fn gray_ramp(tones: u8) -> Vec<Rgb> {
    (0..tones as u32)
        .map(|k| {
            let level = if tones > 1 {
                (255.0 * k as f32 / (tones - 1) as f32).round() as u8
            } else {
                0
            };
            Rgb::new(level, level, level)
        })
        .collect()
}

/// Sparse per-tone color overrides, one slot per possible tone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToneOverrides {
    slots: [Option<Rgb>; MAX_TONES as usize],
}

impl ToneOverrides {
    fn check(index: usize, tones: u8) -> Result<()> {
        if index >= tones as usize || index >= MAX_TONES as usize {
            return Err(ChartError::InvalidTone { index, tones });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.slots.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, color: Rgb, tones: u8) -> Result<()> {
        Self::check(index, tones)?;
        self.slots[index] = Some(color);
        Ok(())
    }

    pub fn reset(&mut self, index: usize, tones: u8) -> Result<()> {
        Self::check(index, tones)?;
        self.slots[index] = None;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_TONES as usize];
    }

    /// Drop every override at or above `tones`.
    pub fn prune(&mut self, tones: u8) {
        for slot in self.slots.iter_mut().skip(tones as usize) {
            *slot = None;
        }
    }

    /// Active overrides as `(index, color)` pairs, lowest index first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Rgb)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.map(|c| (idx, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// The ordered color scale for a chart: one color per tone, index 0 first.
pub fn resolve_colors(
    tones: u8,
    mode: ColorMode,
    palette_name: &str,
    overrides: &ToneOverrides,
) -> Vec<Rgb> {
    let mut colors = match mode {
        ColorMode::Grayscale => gray_ramp(tones),
        ColorMode::Palette => sample_palette(palette_colors(palette_name), tones),
    };
    for (idx, color) in colors.iter_mut().enumerate() {
        if let Some(custom) = overrides.get(idx) {
            *color = custom;
        }
    }
    colors
}

/// Black or white, whichever reads better on `background`.
pub fn label_color(background: Rgb) -> Rgb {
    let lab: Lab<D65, f32> = Lab::from_color(background.into_format::<f32>());
    if lab.l > 55.0 {
        Rgb::new(0, 0, 0)
    } else {
        Rgb::new(255, 255, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_tone_grayscale_ramp() {
        let colors = resolve_colors(4, ColorMode::Grayscale, DEFAULT_PALETTE, &ToneOverrides::default());
        assert_eq!(
            colors,
            vec![
                Rgb::new(0, 0, 0),
                Rgb::new(85, 85, 85),
                Rgb::new(170, 170, 170),
                Rgb::new(255, 255, 255),
            ]
        );
    }

    #[test]
    fn override_changes_only_its_entry() {
        let base = resolve_colors(4, ColorMode::Grayscale, DEFAULT_PALETTE, &ToneOverrides::default());
        let mut overrides = ToneOverrides::default();
        overrides.set(2, Rgb::new(200, 30, 40), 4).unwrap();
        let colors = resolve_colors(4, ColorMode::Grayscale, DEFAULT_PALETTE, &overrides);

        assert_eq!(colors[2], Rgb::new(200, 30, 40));
        for idx in [0, 1, 3] {
            assert_eq!(colors[idx], base[idx]);
        }
    }

    #[test]
    fn overrides_apply_in_palette_mode() {
        let mut overrides = ToneOverrides::default();
        overrides.set(0, Rgb::new(1, 2, 3), 3).unwrap();
        let colors = resolve_colors(3, ColorMode::Palette, "Set2", &overrides);
        assert_eq!(colors[0], Rgb::new(1, 2, 3));
    }

    #[test]
    fn palette_is_sampled_evenly() {
        let colors = resolve_colors(4, ColorMode::Palette, "tab10", &ToneOverrides::default());
        let expected: Vec<Rgb> = ["#1F77B4", "#D62728", "#E377C2", "#17BECF"]
            .iter()
            .map(|h| parse_hex_color(h).unwrap())
            .collect();
        assert_eq!(colors, expected);

        let two = resolve_colors(2, ColorMode::Palette, "Set1", &ToneOverrides::default());
        assert_eq!(two[0], parse_hex_color("#E41A1C").unwrap());
        assert_eq!(two[1], parse_hex_color("#999999").unwrap());
    }

    #[test]
    fn unknown_palette_falls_back_to_default() {
        let none = ToneOverrides::default();
        let fallback = resolve_colors(5, ColorMode::Palette, "no-such-palette", &none);
        let default = resolve_colors(5, ColorMode::Palette, DEFAULT_PALETTE, &none);
        assert_eq!(fallback, default);
        assert_eq!(palette_colors("pastel1"), palette_colors("Pastel1"));
    }

    #[test]
    fn every_palette_entry_parses() {
        for name in palette_names() {
            for hex in palette_colors(name) {
                assert!(parse_hex_color(hex).is_ok(), "{name}: {hex}");
            }
        }
        assert_eq!(palette_names().count(), 10);
    }

    #[test]
    fn out_of_range_tone_is_rejected_without_mutation() {
        let mut overrides = ToneOverrides::default();
        let err = overrides.set(4, Rgb::new(0, 0, 0), 4).unwrap_err();
        assert!(matches!(err, ChartError::InvalidTone { index: 4, tones: 4 }));
        assert!(overrides.is_empty());
        assert!(overrides.reset(12, 10).is_err());
    }

    #[test]
    fn prune_drops_only_high_indices() {
        let mut overrides = ToneOverrides::default();
        for idx in [0, 3, 5, 9] {
            overrides.set(idx, Rgb::new(idx as u8, 0, 0), 10).unwrap();
        }
        overrides.prune(4);
        let kept: Vec<usize> = overrides.iter().map(|(idx, _)| idx).collect();
        assert_eq!(kept, vec![0, 3]);
        assert_eq!(overrides.get(3), Some(Rgb::new(3, 0, 0)));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(parse_hex_color("00ff00").unwrap(), Rgb::new(0, 255, 0));
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
        assert_eq!(rgb_to_hex(Rgb::new(255, 128, 0)), "#FF8000");
    }

    #[test]
    fn label_contrasts_with_swatch() {
        assert_eq!(label_color(Rgb::new(255, 255, 255)), Rgb::new(0, 0, 0));
        assert_eq!(label_color(Rgb::new(0, 0, 0)), Rgb::new(255, 255, 255));
    }
}
