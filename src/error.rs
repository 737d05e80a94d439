use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an extraction. No partial palette is ever returned.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "unsupported or corrupt image: {name}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF"
    )]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot acquire pixel buffer: {width}x{height} needs {expected} bytes, got {actual}")]
    RenderContext {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

impl ExtractError {
    /// True for the "image could not be loaded or parsed" class.
    pub fn is_decode(&self) -> bool {
        matches!(self, ExtractError::NotFound(_) | ExtractError::Decode { .. })
    }
}

/// Durable storage failures. Recovered inside the history store and only logged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage rejected write to {0}")]
    WriteRejected(String),
}
