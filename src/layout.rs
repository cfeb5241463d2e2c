//! Grid geometry: padding, the inner area, and fitting the source image into it.

use serde::{Deserialize, Serialize};

pub const MIN_GRID: u32 = 5;
pub const MAX_AUTO_PAD_PERCENT: u32 = 90;

/// Padding around the image, in stitches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Padding {
    pub fn uniform(border: u32) -> Self {
        Self {
            left: border,
            right: border,
            top: border,
            bottom: border,
        }
    }

    /// Equal padding on every side, `percent` of the shorter grid dimension.
    pub fn auto(rows: u32, cols: u32, percent: u32) -> Self {
        let pct = percent.min(MAX_AUTO_PAD_PERCENT);
        let short = rows.max(MIN_GRID).min(cols.max(MIN_GRID));
        let border = (short as f64 * (pct as f64 / 100.0)).round_ties_even() as u32;
        Self::uniform(border)
    }
}

/// Where the resized source lands inside the full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub inner_w: u32,
    pub inner_h: u32,
    pub new_w: u32,
    pub new_h: u32,
    pub off_x: u32,
    pub off_y: u32,
}

fn source_aspect(src_w: u32, src_h: u32) -> f64 {
    if src_h == 0 {
        1.0
    } else {
        src_w as f64 / src_h as f64
    }
}

/// Fit a `src_w x src_h` image into the padded `rows x cols` grid.
pub fn fit(
    rows: u32,
    cols: u32,
    padding: &Padding,
    keep_aspect: bool,
    src_w: u32,
    src_h: u32,
) -> Placement {
    let inner_w = cols
        .saturating_sub(padding.left)
        .saturating_sub(padding.right)
        .max(1);
    let inner_h = rows
        .saturating_sub(padding.top)
        .saturating_sub(padding.bottom)
        .max(1);

    let (new_w, new_h) = if keep_aspect {
        let target_aspect = inner_w as f64 / inner_h as f64;
        let src_aspect = source_aspect(src_w, src_h);
        if src_aspect > target_aspect {
            let h = (inner_w as f64 / src_aspect).round_ties_even() as u32;
            (inner_w, h.clamp(1, inner_h))
        } else {
            let w = (inner_h as f64 * src_aspect).round_ties_even() as u32;
            (w.clamp(1, inner_w), inner_h)
        }
    } else {
        (inner_w, inner_h)
    };

    Placement {
        inner_w,
        inner_h,
        new_w,
        new_h,
        off_x: padding.left + (inner_w - new_w) / 2,
        off_y: padding.top + (inner_h - new_h) / 2,
    }
}

/// Column count matching `rows` under the source aspect ratio.
pub fn cols_for_rows(rows: u32, src_w: u32, src_h: u32) -> u32 {
    let rows = rows.max(MIN_GRID);
    let cols = (rows as f64 * source_aspect(src_w, src_h)).round_ties_even() as u32;
    cols.max(MIN_GRID)
}

/// Row count matching `cols` under the source aspect ratio.
pub fn rows_for_cols(cols: u32, src_w: u32, src_h: u32) -> u32 {
    let cols = cols.max(MIN_GRID);
    let rows = (cols as f64 / source_aspect(src_w, src_h)).round_ties_even() as u32;
    rows.max(MIN_GRID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_source_fills_matching_grid() {
        let cols = cols_for_rows(50, 200, 100);
        assert_eq!(cols, 100);

        let placement = fit(50, cols, &Padding::default(), true, 200, 100);
        assert_eq!((placement.inner_w, placement.inner_h), (100, 50));
        assert_eq!((placement.new_w, placement.new_h), (100, 50));
        assert_eq!((placement.off_x, placement.off_y), (0, 0));
    }

    #[test]
    fn horizontal_padding_shrinks_and_offsets() {
        let padding = Padding {
            left: 10,
            right: 10,
            ..Padding::default()
        };
        let placement = fit(100, 100, &padding, true, 100, 100);
        assert_eq!(placement.inner_w, 80);
        assert_eq!(placement.inner_h, 100);
        assert_eq!((placement.new_w, placement.new_h), (80, 80));
        assert_eq!(placement.off_x, 10);
        assert_eq!(placement.off_y, 10);
    }

    #[test]
    fn oversized_padding_clamps_inner_area() {
        let padding = Padding::uniform(400);
        for keep_aspect in [false, true] {
            let placement = fit(5, 5, &padding, keep_aspect, 640, 480);
            assert_eq!(placement.inner_w, 1);
            assert_eq!(placement.inner_h, 1);
            assert_eq!((placement.new_w, placement.new_h), (1, 1));
        }
    }

    #[test]
    fn stretch_ignores_aspect() {
        let placement = fit(30, 90, &Padding::default(), false, 10, 1000);
        assert_eq!((placement.new_w, placement.new_h), (90, 30));
        assert_eq!((placement.off_x, placement.off_y), (0, 0));
    }

    #[test]
    fn tall_source_is_centered_horizontally() {
        let placement = fit(40, 40, &Padding::default(), true, 50, 100);
        assert_eq!((placement.new_w, placement.new_h), (20, 40));
        assert_eq!(placement.off_x, 10);
        assert_eq!(placement.off_y, 0);
    }

    #[test]
    fn aspect_round_trip_does_not_drift() {
        for (w, h) in [(200, 100), (640, 480), (333, 1000), (1, 1), (1920, 1081)] {
            for rows in [5, 17, 50, 139, 400] {
                let cols = cols_for_rows(rows, w, h);
                let back = rows_for_cols(cols, w, h);
                let cols_again = cols_for_rows(back, w, h);
                assert!(
                    (cols_again as i64 - cols as i64).abs() <= 1,
                    "{w}x{h} rows={rows}: {cols} -> {back} -> {cols_again}"
                );
            }
        }
    }

    #[test]
    fn derived_dimension_never_drops_below_minimum() {
        assert_eq!(cols_for_rows(5, 1, 1000), MIN_GRID);
        assert_eq!(rows_for_cols(5, 1000, 1), MIN_GRID);
        assert_eq!(cols_for_rows(10, 10, 0), 10);
    }

    #[test]
    fn auto_padding_uses_shorter_side() {
        assert_eq!(Padding::auto(139, 100, 10), Padding::uniform(10));
        assert_eq!(Padding::auto(50, 200, 0), Padding::uniform(0));
        // Percentage is capped at 90.
        assert_eq!(Padding::auto(100, 100, 150), Padding::uniform(90));
        // Grid dimensions are clamped to the minimum first.
        assert_eq!(Padding::auto(1, 1, 40), Padding::uniform(2));
    }

    #[test]
    fn halves_round_to_even() {
        // 10% of 25 is 2.5, 10% of 35 is 3.5.
        assert_eq!(Padding::auto(25, 40, 10), Padding::uniform(2));
        assert_eq!(Padding::auto(35, 40, 10), Padding::uniform(4));

        assert_eq!(cols_for_rows(13, 1, 2), 6);
        assert_eq!(rows_for_cols(13, 2, 1), 6);

        let wide = fit(10, 13, &Padding::default(), true, 2, 1);
        assert_eq!((wide.new_w, wide.new_h, wide.off_y), (13, 6, 2));
        let tall = fit(13, 10, &Padding::default(), true, 1, 2);
        assert_eq!((tall.new_w, tall.new_h, tall.off_x), (6, 13, 2));
    }
}
