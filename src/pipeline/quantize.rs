use crate::color::Color;

/// Buckets per channel used by the extractor.
pub const DEFAULT_LEVELS: u32 = 8;

/// Snap an 8-bit channel value down to the start of its bucket.
///
/// The 0-255 range is split into `levels` equal-width buckets of
/// `256 / levels` (real-valued) and the value is floored to its bucket's
/// lower edge. With 8 levels the result is always one of
/// `0, 32, 64, ..., 224`. A `levels` of 0 behaves like 1.
pub fn quantize(value: u8, levels: u32) -> u8 {
    let step = 256.0 / f64::from(levels.max(1));
    let bucket = (f64::from(value) / step).floor();
    (bucket * step).floor().min(255.0) as u8
}

/// Quantize all three channels of a color independently.
pub fn quantize_color(color: Color, levels: u32) -> Color {
    Color::new(
        quantize(color.r, levels),
        quantize(color.g, levels),
        quantize(color.b, levels),
    )
}
