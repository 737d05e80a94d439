use crate::pipeline::extract::ExtractedColor;

use super::PaletteExporter;

/// One `$color-N: #hex;` line per color.
pub struct ScssExporter;

impl PaletteExporter for ScssExporter {
    fn name(&self) -> &str {
        "SCSS"
    }

    fn extension(&self) -> &str {
        "scss"
    }

    fn serialize(&self, colors: &[ExtractedColor]) -> String {
        colors
            .iter()
            .enumerate()
            .map(|(i, color)| format!("$color-{}: {};\n", i + 1, color.hex))
            .collect()
    }
}
