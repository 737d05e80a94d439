use crate::pipeline::extract::ExtractedColor;

use super::PaletteExporter;

/// `:root { --color-N: #hex; }` custom-property block.
pub struct CssExporter;

impl PaletteExporter for CssExporter {
    fn name(&self) -> &str {
        "CSS"
    }

    fn extension(&self) -> &str {
        "css"
    }

    fn serialize(&self, colors: &[ExtractedColor]) -> String {
        let mut out = String::from(":root {\n");
        for (i, color) in colors.iter().enumerate() {
            out.push_str(&format!("  --color-{}: {};\n", i + 1, color.hex));
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn two_colors_exact_output() {
        let colors = vec![
            ExtractedColor::new(Color::new(0xaa, 0xbb, 0xcc), 1),
            ExtractedColor::new(Color::new(0x11, 0x22, 0x33), 1),
        ];
        assert_eq!(
            CssExporter.serialize(&colors),
            ":root {\n  --color-1: #aabbcc;\n  --color-2: #112233;\n}"
        );
    }

    #[test]
    fn empty_palette_is_empty_rule() {
        assert_eq!(CssExporter.serialize(&[]), ":root {\n}");
    }

    #[test]
    fn numbering_follows_input_order() {
        // Lower count first on purpose: exporters must not re-sort
        let colors = vec![
            ExtractedColor::new(Color::new(1, 2, 3), 1),
            ExtractedColor::new(Color::new(4, 5, 6), 50),
        ];
        let output = CssExporter.serialize(&colors);
        assert!(output.contains("--color-1: #010203;"));
        assert!(output.contains("--color-2: #040506;"));
    }
}
