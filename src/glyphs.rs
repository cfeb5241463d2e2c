//! 5x7 bitmap glyphs for drawing chart text on rasters without a font file.

pub const GLYPH_COLS: usize = 5;
pub const GLYPH_ROWS: usize = 7;
/// Horizontal advance per character, in glyph cells (glyph plus one blank column).
pub const GLYPH_ADVANCE: usize = GLYPH_COLS + 1;

const BLANK: [&str; 7] = [
    "00000", "00000", "00000", "00000", "00000", "00000", "00000",
];

/// Bitmap rows, top first. Lowercase letters share the uppercase shapes.
pub fn glyph(ch: char) -> Option<[&'static str; 7]> {
    let glyph = match ch.to_ascii_uppercase() {
        ' ' => BLANK,
        '0' => [
            "01110", "10001", "10011", "10101", "11001", "10001", "01110",
        ],
        '1' => [
            "00100", "01100", "00100", "00100", "00100", "00100", "01110",
        ],
        '2' => [
            "01110", "10001", "00001", "00010", "00100", "01000", "11111",
        ],
        '3' => [
            "11110", "00001", "00001", "01110", "00001", "00001", "11110",
        ],
        '4' => [
            "00010", "00110", "01010", "10010", "11111", "00010", "00010",
        ],
        '5' => [
            "11111", "10000", "11110", "00001", "00001", "10001", "01110",
        ],
        '6' => [
            "00110", "01000", "10000", "11110", "10001", "10001", "01110",
        ],
        '7' => [
            "11111", "00001", "00010", "00100", "01000", "01000", "01000",
        ],
        '8' => [
            "01110", "10001", "10001", "01110", "10001", "10001", "01110",
        ],
        '9' => [
            "01110", "10001", "10001", "01111", "00001", "00010", "01100",
        ],
        'A' => [
            "01110", "10001", "10001", "11111", "10001", "10001", "10001",
        ],
        'B' => [
            "11110", "10001", "10001", "11110", "10001", "10001", "11110",
        ],
        'C' => [
            "01111", "10000", "10000", "10000", "10000", "10000", "01111",
        ],
        'D' => [
            "11110", "10001", "10001", "10001", "10001", "10001", "11110",
        ],
        'E' => [
            "11111", "10000", "10000", "11110", "10000", "10000", "11111",
        ],
        'F' => [
            "11111", "10000", "10000", "11110", "10000", "10000", "10000",
        ],
        'G' => [
            "01111", "10000", "10000", "10011", "10001", "10001", "01111",
        ],
        'H' => [
            "10001", "10001", "10001", "11111", "10001", "10001", "10001",
        ],
        'I' => [
            "01110", "00100", "00100", "00100", "00100", "00100", "01110",
        ],
        'J' => [
            "00111", "00010", "00010", "00010", "00010", "10010", "01100",
        ],
        'K' => [
            "10001", "10010", "10100", "11000", "10100", "10010", "10001",
        ],
        'L' => [
            "10000", "10000", "10000", "10000", "10000", "10000", "11111",
        ],
        'M' => [
            "10001", "11011", "10101", "10101", "10001", "10001", "10001",
        ],
        'N' => [
            "10001", "11001", "10101", "10011", "10001", "10001", "10001",
        ],
        'O' => [
            "01110", "10001", "10001", "10001", "10001", "10001", "01110",
        ],
        'P' => [
            "11110", "10001", "10001", "11110", "10000", "10000", "10000",
        ],
        'Q' => [
            "01110", "10001", "10001", "10001", "10101", "10010", "01101",
        ],
        'R' => [
            "11110", "10001", "10001", "11110", "10100", "10010", "10001",
        ],
        'S' => [
            "01111", "10000", "10000", "01110", "00001", "00001", "11110",
        ],
        'T' => [
            "11111", "00100", "00100", "00100", "00100", "00100", "00100",
        ],
        'U' => [
            "10001", "10001", "10001", "10001", "10001", "10001", "01110",
        ],
        'V' => [
            "10001", "10001", "10001", "10001", "10001", "01010", "00100",
        ],
        'W' => [
            "10001", "10001", "10001", "10101", "10101", "10101", "01010",
        ],
        'X' => [
            "10001", "10001", "01010", "00100", "01010", "10001", "10001",
        ],
        'Y' => [
            "10001", "10001", "01010", "00100", "00100", "00100", "00100",
        ],
        'Z' => [
            "11111", "00001", "00010", "00100", "01000", "10000", "11111",
        ],
        '(' => [
            "00010", "00100", "01000", "01000", "01000", "00100", "00010",
        ],
        ')' => [
            "01000", "00100", "00010", "00010", "00010", "00100", "01000",
        ],
        ',' => [
            "00000", "00000", "00000", "00000", "00110", "00100", "01000",
        ],
        '.' => [
            "00000", "00000", "00000", "00000", "00000", "01100", "01100",
        ],
        '-' => [
            "00000", "00000", "00000", "11111", "00000", "00000", "00000",
        ],
        ':' => [
            "00000", "01100", "01100", "00000", "01100", "01100", "00000",
        ],
        '#' => [
            "01010", "11111", "01010", "01010", "11111", "01010", "01010",
        ],
        '%' => [
            "11001", "11010", "00100", "01000", "10110", "00110", "00000",
        ],
        '?' => [
            "01110", "10001", "00001", "00010", "00100", "00000", "00100",
        ],
        _ => return None,
    };
    Some(glyph)
}

/// Width of `text` in glyph cells, without trailing spacing.
pub fn text_cells(text: &str) -> usize {
    let n = text.chars().count();
    if n == 0 {
        0
    } else {
        n * GLYPH_ADVANCE - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_are_well_formed() {
        let sample = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789(),.-:#%? ";
        for ch in sample.chars() {
            let g = glyph(ch).unwrap_or_else(|| panic!("missing glyph for {ch:?}"));
            assert_eq!(g.len(), GLYPH_ROWS);
            for row in g {
                assert_eq!(row.len(), GLYPH_COLS, "{ch:?}");
                assert!(row.bytes().all(|b| b == b'0' || b == b'1'));
            }
        }
    }

    #[test]
    fn lowercase_maps_to_uppercase() {
        assert_eq!(glyph('x'), glyph('X'));
        assert!(glyph('~').is_none());
    }

    #[test]
    fn text_width_in_cells() {
        assert_eq!(text_cells(""), 0);
        assert_eq!(text_cells("1"), 5);
        assert_eq!(text_cells("139"), 17);
    }
}
