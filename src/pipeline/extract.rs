use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ExtractError;
use crate::palette::ExtractedPalette;

use super::decode::{load_and_prepare, ImageSource, PixelBuffer};
use super::quantize::{quantize_color, DEFAULT_LEVELS};

/// A quantized color extracted from the image with its pixel count.
///
/// `hex` always spells `rgb`; deserializing a pair that disagrees fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredColor")]
pub struct ExtractedColor {
    pub hex: String,
    pub rgb: Color,
    pub count: u32,
}

impl ExtractedColor {
    pub fn new(rgb: Color, count: u32) -> Self {
        Self {
            hex: rgb.to_hex(),
            rgb,
            count,
        }
    }
}

#[derive(Deserialize)]
struct StoredColor {
    hex: String,
    rgb: Color,
    count: u32,
}

impl TryFrom<StoredColor> for ExtractedColor {
    type Error = String;

    fn try_from(stored: StoredColor) -> Result<Self, Self::Error> {
        let color = Self::new(stored.rgb, stored.count);
        if !stored.hex.eq_ignore_ascii_case(&color.hex) {
            return Err(format!(
                "hex {} does not match rgb {}",
                stored.hex, color.hex
            ));
        }
        Ok(color)
    }
}

/// Pixels with alpha below this are treated as transparent.
const MIN_ALPHA: u8 = 128;
const NEAR_BLACK_MAX: u8 = 30;
const NEAR_WHITE_MIN: u8 = 225;

/// Near-black or near-white on quantized channels.
///
/// With 8 levels the brightest bucket is 224, so the white half of the
/// predicate only matters for finer quantization.
fn is_extreme(c: Color) -> bool {
    let near_black = c.r < NEAR_BLACK_MAX && c.g < NEAR_BLACK_MAX && c.b < NEAR_BLACK_MAX;
    let near_white = c.r > NEAR_WHITE_MIN && c.g > NEAR_WHITE_MIN && c.b > NEAR_WHITE_MIN;
    near_black || near_white
}

/// Count quantized colors and return the `k` most frequent.
///
/// Transparent pixels and near-black/near-white buckets are skipped.
/// Results are sorted by count descending; equal counts keep the order in
/// which the colors were first seen scanning row-major. Returns fewer than
/// `k` colors when the image doesn't have that many, and nothing for `k == 0`.
pub fn extract_colors(pixels: &PixelBuffer, k: usize) -> Vec<ExtractedColor> {
    if k == 0 {
        return Vec::new();
    }

    let mut colors: Vec<ExtractedColor> = Vec::new();
    let mut index: HashMap<Color, usize> = HashMap::new();

    for [r, g, b, a] in pixels.pixels() {
        if a < MIN_ALPHA {
            continue;
        }
        let quantized = quantize_color(Color::new(r, g, b), DEFAULT_LEVELS);
        if is_extreme(quantized) {
            continue;
        }

        match index.get(&quantized) {
            Some(&i) => colors[i].count += 1,
            None => {
                index.insert(quantized, colors.len());
                colors.push(ExtractedColor::new(quantized, 1));
            }
        }
    }

    // Stable sort keeps first-encounter order for ties
    colors.sort_by(|a, b| b.count.cmp(&a.count));
    colors.truncate(k);
    colors
}

/// Decode `source` and extract its top `k` colors.
pub fn extract_palette(source: &ImageSource, k: usize) -> Result<ExtractedPalette, ExtractError> {
    let pixels = load_and_prepare(source)?;
    let colors = extract_colors(&pixels, k);
    tracing::debug!(source = %source, k, found = colors.len(), "extracted palette");
    Ok(ExtractedPalette {
        source_image: source.reference(),
        colors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE: u8 = 255;

    fn buffer(width: u32, height: u32, pixels: &[[u8; 4]]) -> PixelBuffer {
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    fn solid(width: u32, height: u32, px: [u8; 4]) -> PixelBuffer {
        let pixels = vec![px; (width * height) as usize];
        buffer(width, height, &pixels)
    }

    #[test]
    fn two_identical_pixels_merge() {
        let pixels = buffer(2, 1, &[[200, 50, 50, OPAQUE], [200, 50, 50, OPAQUE]]);
        let colors = extract_colors(&pixels, 5);

        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].count, 2);
        assert_eq!(colors[0].rgb, Color::new(192, 32, 32));
        assert_eq!(colors[0].hex, "#c02020");
    }

    #[test]
    fn nearby_values_share_a_bucket() {
        let pixels = buffer(2, 1, &[[192, 40, 60, OPAQUE], [223, 63, 33, OPAQUE]]);
        let colors = extract_colors(&pixels, 5);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].count, 2);
    }

    #[test]
    fn all_black_image_is_empty() {
        let colors = extract_colors(&solid(8, 8, [0, 0, 0, OPAQUE]), 5);
        assert!(colors.is_empty());
    }

    #[test]
    fn near_black_excluded_even_when_dominant() {
        let mut pixels = vec![[10, 20, 25, OPAQUE]; 99];
        pixels.push([100, 150, 200, OPAQUE]);
        let colors = extract_colors(&buffer(10, 10, &pixels), 5);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex, "#6080c0");
    }

    #[test]
    fn white_survives_eight_level_quantization() {
        // 255 quantizes to 224, which is not above the near-white cutoff
        let colors = extract_colors(&solid(3, 3, [255, 255, 255, OPAQUE]), 5);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex, "#e0e0e0");
        assert_eq!(colors[0].count, 9);
    }

    #[test]
    fn dark_but_not_black_is_kept() {
        // 32 in one channel escapes the near-black predicate
        let colors = extract_colors(&solid(1, 1, [0, 0, 40, OPAQUE]), 5);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].rgb, Color::new(0, 0, 32));
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let pixels = buffer(
            3,
            1,
            &[[200, 50, 50, 127], [200, 50, 50, 0], [50, 50, 200, 128]],
        );
        let colors = extract_colors(&pixels, 5);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex, "#2020c0");
    }

    #[test]
    fn sorted_by_count_descending() {
        let mut pixels = vec![[50, 200, 50, OPAQUE]; 1];
        pixels.extend(vec![[200, 50, 50, OPAQUE]; 3]);
        pixels.extend(vec![[50, 50, 200, OPAQUE]; 2]);
        let colors = extract_colors(&buffer(6, 1, &pixels), 5);

        let counts: Vec<u32> = colors.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert_eq!(colors[0].hex, "#c02020");
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let pixels = buffer(
            4,
            1,
            &[
                [50, 50, 200, OPAQUE],
                [200, 50, 50, OPAQUE],
                [200, 50, 50, OPAQUE],
                [50, 50, 200, OPAQUE],
            ],
        );
        let colors = extract_colors(&pixels, 5);
        assert_eq!(colors[0].hex, "#2020c0");
        assert_eq!(colors[1].hex, "#c02020");
    }

    #[test]
    fn truncates_to_k() {
        let pixels: Vec<[u8; 4]> = (0..8u8).map(|i| [i * 32, 128, 64, OPAQUE]).collect();
        let colors = extract_colors(&buffer(8, 1, &pixels), 3);
        assert_eq!(colors.len(), 3);
    }

    #[test]
    fn fewer_colors_than_k_is_not_padded() {
        let colors = extract_colors(&solid(2, 2, [100, 100, 100, OPAQUE]), 7);
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn zero_k_is_empty() {
        let colors = extract_colors(&solid(2, 2, [100, 100, 100, OPAQUE]), 0);
        assert!(colors.is_empty());
    }

    #[test]
    fn empty_buffer_is_empty() {
        let colors = extract_colors(&buffer(0, 0, &[]), 5);
        assert!(colors.is_empty());
    }

    #[test]
    fn extract_palette_records_source() {
        let img = image::RgbaImage::from_fn(2, 1, |_, _| image::Rgba([200, 50, 50, 255]));
        let mut data = std::io::Cursor::new(Vec::new());
        img.write_to(&mut data, image::ImageFormat::Png).unwrap();
        let source = ImageSource::Bytes {
            name: "red.png".to_string(),
            data: data.into_inner(),
        };

        let palette = extract_palette(&source, 5).unwrap();
        assert_eq!(palette.source_image, "red.png");
        assert_eq!(palette.colors, vec![ExtractedColor::new(Color::new(192, 32, 32), 2)]);
    }

    #[test]
    fn extract_palette_propagates_decode_errors() {
        let err = extract_palette(&ImageSource::from_path("/nonexistent/x.png"), 5).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn stored_color_with_matching_hex_loads() {
        let json = r##"{"hex":"#C02020","rgb":{"r":192,"g":32,"b":32},"count":4}"##;
        let color: ExtractedColor = serde_json::from_str(json).unwrap();
        assert_eq!(color, ExtractedColor::new(Color::new(192, 32, 32), 4));
        assert_eq!(color.hex, "#c02020");
    }

    #[test]
    fn stored_color_with_mismatched_hex_is_rejected() {
        let json = r##"{"hex":"#ffffff","rgb":{"r":192,"g":32,"b":32},"count":4}"##;
        let err = serde_json::from_str::<ExtractedColor>(json).unwrap_err();
        assert!(err.to_string().contains("does not match rgb #c02020"));
    }
}
