use std::sync::mpsc::Sender;
use std::thread;

use chrono::{DateTime, Utc};

use crate::error::ExtractError;
use crate::palette::{ExtractedPalette, SavedPalette};
use crate::pipeline::decode::ImageSource;
use crate::pipeline::extract::extract_palette;

/// Identifies one extraction request. Later requests get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Everything a worker needs to run one extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub token: RequestToken,
    pub source: ImageSource,
    pub color_count: usize,
}

impl ExtractionRequest {
    pub fn run(&self) -> ExtractionResult {
        ExtractionResult {
            token: self.token,
            outcome: extract_palette(&self.source, self.color_count),
        }
    }

    /// Run on a new thread and send the result to `tx`.
    pub fn spawn(self, tx: Sender<ExtractionResult>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            // The receiver may be gone if the UI quit first
            let _ = tx.send(self.run());
        })
    }
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub token: RequestToken,
    pub outcome: Result<ExtractedPalette, ExtractError>,
}

/// What happened to a completed extraction.
#[derive(Debug)]
pub enum Completion {
    /// The latest request succeeded and its palette is now current.
    Applied,
    /// A newer request exists; the result was dropped.
    Stale,
    /// The latest request failed; the previous palette is still current.
    Failed(ExtractError),
}

/// Tracks the image and color count being viewed and the palette shown for them.
///
/// Every change to the image or the count issues a new request; only the
/// most recent request may update the current palette.
#[derive(Debug, Default)]
pub struct ExtractionSession {
    last_issued: u64,
    pending: Option<RequestToken>,
    image: Option<ImageSource>,
    color_count: usize,
    current: Option<ExtractedPalette>,
}

impl ExtractionSession {
    pub fn new(color_count: usize) -> Self {
        Self {
            color_count,
            ..Self::default()
        }
    }

    /// Switch to a new image. The old palette is dropped.
    pub fn set_image(&mut self, source: ImageSource) -> ExtractionRequest {
        self.image = Some(source.clone());
        self.current = None;
        self.issue(source)
    }

    /// Change the color count, re-extracting the current image if there is one.
    pub fn set_color_count(&mut self, color_count: usize) -> Option<ExtractionRequest> {
        self.color_count = color_count;
        let source = self.image.clone()?;
        Some(self.issue(source))
    }

    /// Switch to an image whose palette is already known, e.g. from history.
    ///
    /// `palette` is shown right away and the image is re-extracted at the
    /// current color count. If that fails, `palette` stays current. Any
    /// in-flight request becomes stale.
    pub fn reopen(&mut self, image: ImageSource, palette: ExtractedPalette) -> ExtractionRequest {
        self.image = Some(image.clone());
        self.current = Some(palette);
        self.issue(image)
    }

    /// Accept a worker result if it belongs to the latest request.
    pub fn complete(&mut self, result: ExtractionResult) -> Completion {
        if self.pending != Some(result.token) {
            tracing::debug!(token = result.token.0, "discarding stale extraction");
            return Completion::Stale;
        }
        self.pending = None;
        match result.outcome {
            Ok(palette) => {
                self.current = Some(palette);
                Completion::Applied
            }
            Err(e) => {
                tracing::warn!(%e, "extraction failed, keeping previous palette");
                Completion::Failed(e)
            }
        }
    }

    pub fn current(&self) -> Option<&ExtractedPalette> {
        self.current.as_ref()
    }

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    pub fn color_count(&self) -> usize {
        self.color_count
    }

    pub fn is_extracting(&self) -> bool {
        self.pending.is_some()
    }

    /// The current palette ready for history, if there is an image and a palette.
    pub fn to_saved(&self, saved_at: DateTime<Utc>) -> Option<SavedPalette> {
        let image = self.image.as_ref()?;
        let palette = self.current.clone()?;
        Some(SavedPalette::new(palette, image.reference(), saved_at))
    }

    fn issue(&mut self, source: ImageSource) -> ExtractionRequest {
        self.last_issued += 1;
        let token = RequestToken(self.last_issued);
        self.pending = Some(token);
        ExtractionRequest {
            token,
            source,
            color_count: self.color_count,
        }
    }
}
