use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::extract::ExtractedColor;

/// Colors extracted from one image, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPalette {
    pub source_image: String,
    pub colors: Vec<ExtractedColor>,
}

/// A palette the user chose to keep, as stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPalette {
    #[serde(flatten)]
    pub palette: ExtractedPalette,
    pub image_url: String,
    /// ISO-8601, e.g. `2026-10-19T08:30:00.000Z`.
    pub timestamp: String,
}

impl SavedPalette {
    pub fn new(
        palette: ExtractedPalette,
        image_url: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            palette,
            image_url: image_url.into(),
            timestamp: saved_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn colors(&self) -> &[ExtractedColor] {
        &self.palette.colors
    }
}
