pub mod css;
pub mod scss;

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::extract::ExtractedColor;

pub use css::CssExporter;
pub use scss::ScssExporter;

/// Renders a palette as source code a stylesheet build can consume.
///
/// Colors are numbered from 1 in the order given; exporters never re-sort.
pub trait PaletteExporter {
    /// Human-readable format name.
    fn name(&self) -> &str;

    /// File extension, without the dot.
    fn extension(&self) -> &str;

    /// Render the colors to text.
    fn serialize(&self, colors: &[ExtractedColor]) -> String;

    /// Write the rendered colors to `path`.
    fn write_to(&self, colors: &[ExtractedColor], path: &Path) -> Result<()> {
        let content = self.serialize(colors);
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {} to {}", self.name(), path.display()))?;
        Ok(())
    }
}

/// Export formats selectable from the command line and the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Css,
    Scss,
}

impl ExportFormat {
    pub fn exporter(self) -> &'static dyn PaletteExporter {
        match self {
            ExportFormat::Css => &CssExporter,
            ExportFormat::Scss => &ScssExporter,
        }
    }

    /// The other format, for toggling.
    pub fn toggled(self) -> Self {
        match self {
            ExportFormat::Css => ExportFormat::Scss,
            ExportFormat::Scss => ExportFormat::Css,
        }
    }
}
