use std::io::Write;

use anyhow::Result;
use crossterm::queue;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::color::Color;
use crate::pipeline::extract::ExtractedColor;

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Label shown on a swatch: `Color N  #hex`.
pub fn swatch_label(index: usize, color: &ExtractedColor) -> String {
    format!("Color {}  {}", index + 1, color.hex)
}

/// Print one colored swatch line per color, text in the contrasting color.
pub fn write_preview(out: &mut impl Write, colors: &[ExtractedColor]) -> Result<()> {
    for (i, color) in colors.iter().enumerate() {
        let label = format!(" {:<24}", swatch_label(i, color));
        queue!(
            out,
            SetBackgroundColor(to_term(color.rgb)),
            SetForegroundColor(to_term(color.rgb.contrast_text())),
            Print(label),
            ResetColor,
            Print(format!(
                "  RGB: {}, {}, {}\n",
                color.rgb.r, color.rgb.g, color.rgb.b
            )),
        )?;
    }
    out.flush()?;
    Ok(())
}
