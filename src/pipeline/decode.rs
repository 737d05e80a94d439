use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::error::ExtractError;

/// Longest side, in pixels, of the buffer handed to the extractor.
pub const MAX_DIMENSION: u32 = 400;

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded image bytes plus a display name used as the palette's source reference.
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    /// Identifier recorded as `sourceImage` / `imageUrl` on palettes.
    pub fn reference(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// Row-major RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes. Fails if the length is not `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ExtractError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ExtractError::RenderContext {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer from a list of `[r, g, b, a]` pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> Result<Self, ExtractError> {
        Self::new(width, height, pixels.concat())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Iterate pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Dimensions the image is drawn at before extraction.
///
/// The longer side is capped at [`MAX_DIMENSION`] and the shorter side is
/// scaled by the same factor and rounded. Images already within the cap
/// keep their size.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let max = MAX_DIMENSION;
    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (f64::from(short) / f64::from(long) * f64::from(max)).round() as u32;
        scaled.max(1)
    };

    if width > height && width > max {
        (max, scale(height, width))
    } else if height > max {
        (scale(width, height), max)
    } else {
        (width, height)
    }
}

/// Decode an image and downscale it to the extraction resolution.
pub fn load_and_prepare(source: &ImageSource) -> Result<PixelBuffer, ExtractError> {
    let img = match source {
        ImageSource::Path(path) => open_path(path)?,
        ImageSource::Bytes { name, data } => {
            image::load_from_memory(data).map_err(|source| ExtractError::Decode {
                name: name.clone(),
                source,
            })?
        }
    };

    let (width, height) = target_dimensions(img.width(), img.height());
    let rgba = img.to_rgba8();
    let rgba = if (width, height) == rgba.dimensions() {
        rgba
    } else {
        // Bilinear, like a 2D canvas drawImage
        image::imageops::resize(&rgba, width, height, FilterType::Triangle)
    };

    tracing::debug!(
        source = %source,
        original_width = img.width(),
        original_height = img.height(),
        width,
        height,
        "decoded image"
    );

    PixelBuffer::new(width, height, rgba.into_raw())
}

fn open_path(path: &Path) -> Result<image::DynamicImage, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|source| ExtractError::Decode {
        name: path.display().to_string(),
        source,
    })
}
