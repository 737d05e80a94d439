use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Core color type used throughout the pipeline.
/// Plain sRGB u8 components, serialized as `{"r":..,"g":..,"b":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
pub const WHITE: Color = Color {
    r: 255,
    g: 255,
    b: 255,
};

/// Brightness below which text on a color should be white.
const CONTRAST_THRESHOLD: f32 = 128.0;

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            bail!("invalid hex color {hex:?}: expected 6 hex digits");
        }
        let r = u8::from_str_radix(&digits[0..2], 16)?;
        let g = u8::from_str_radix(&digits[2..4], 16)?;
        let b = u8::from_str_radix(&digits[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }

    /// Perceived brightness, `0.299 R + 0.587 G + 0.114 B` on the 0-255 scale.
    pub fn brightness(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }

    /// White for dark colors, black for light ones.
    pub fn contrast_text(self) -> Color {
        if self.brightness() < CONTRAST_THRESHOLD {
            WHITE
        } else {
            BLACK
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Render three channels as lowercase, zero-padded `#rrggbb`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Pick the text color (`#ffffff` or `#000000`) that reads best on `hex`.
pub fn contrast_text_color(hex: &str) -> Result<&'static str> {
    let color = Color::from_hex(hex)?;
    Ok(if color.contrast_text() == WHITE {
        "#ffffff"
    } else {
        "#000000"
    })
}
