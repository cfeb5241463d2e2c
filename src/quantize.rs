//! Even-bin luminance quantization.
//!
//! Tone 0 is always the darkest bin and tone `T - 1` the lightest, so the
//! chart keeps the perceptual ordering of the source image.

/// Interior bin edges for `tones` bins over `0..=255`.
///
/// `edge_k = round(255 * k / tones)` for `k = 1..tones`, i.e. `tones - 1` edges.
pub fn bin_edges(tones: u8) -> Vec<u8> {
    if tones <= 1 {
        return Vec::new();
    }
    (1..tones as u32)
        .map(|k| ((255.0 * k as f32) / tones as f32).round() as u8)
        .collect()
}

/// Tone index of a single luminance value: the number of edges at or below it.
pub fn quantize_value(value: u8, edges: &[u8]) -> u8 {
    edges.partition_point(|&edge| edge <= value) as u8
}

/// Quantize a row-major luminance buffer into tone indices.
pub fn quantize(luma: &[u8], tones: u8) -> Vec<u8> {
    if tones <= 1 {
        return vec![0; luma.len()];
    }
    let edges = bin_edges(tones);

    // Only 256 possible inputs, so resolve each once.
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = quantize_value(value as u8, &edges);
    }

    luma.iter().map(|&v| lut[v as usize]).collect()
}
