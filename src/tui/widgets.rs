use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::color::Color as AppColor;
use crate::date::format_timestamp;
use crate::export::ExportFormat;
use crate::palette::SavedPalette;
use crate::pipeline::extract::ExtractedColor;

const SWATCH_WIDTH: usize = 28;

fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Renders extracted colors as full-width swatches, one per row, labelled
/// in the contrasting text color with the RGB values beside them.
pub struct PaletteWidget<'a> {
    colors: &'a [ExtractedColor],
    extracting: bool,
}

impl<'a> PaletteWidget<'a> {
    pub fn new(colors: &'a [ExtractedColor], extracting: bool) -> Self {
        Self { colors, extracting }
    }
}

fn swatch_line(index: usize, color: &ExtractedColor) -> Line<'static> {
    let style = Style::default()
        .bg(to_color(color.rgb))
        .fg(to_color(color.rgb.contrast_text()));
    let label = format!(" Color {:<3}{:>w$} ", index + 1, color.hex, w = SWATCH_WIDTH - 11);
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(
                "  RGB: {}, {}, {}",
                color.rgb.r, color.rgb.g, color.rgb.b
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

impl Widget for PaletteWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Color Palette");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        if self.extracting {
            lines.push(Line::styled(
                "  Extracting colors...",
                Style::default().fg(Color::Yellow),
            ));
            lines.push(Line::from(""));
        }
        if self.colors.is_empty() && !self.extracting {
            lines.push(Line::styled(
                "  No colors found",
                Style::default().fg(Color::DarkGray),
            ));
        }
        for (i, color) in self.colors.iter().enumerate() {
            lines.push(swatch_line(i, color));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Shows the palette as CSS or SCSS source.
pub struct ExportWidget<'a> {
    colors: &'a [ExtractedColor],
    format: ExportFormat,
}

impl<'a> ExportWidget<'a> {
    pub fn new(colors: &'a [ExtractedColor], format: ExportFormat) -> Self {
        Self { colors, format }
    }
}

impl Widget for ExportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let exporter = self.format.exporter();
        let title = format!("Export: {} (f to switch)", exporter.name());
        let block = Block::bordered().title(title);
        let code = exporter.serialize(self.colors);
        Paragraph::new(code)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Saved palettes, newest first, with a color strip and relative date.
/// Highlights the currently selected entry.
pub struct HistoryWidget<'a, Tz: chrono::TimeZone> {
    palettes: &'a [SavedPalette],
    selected: usize,
    now: chrono::DateTime<Tz>,
}

impl<'a, Tz: chrono::TimeZone> HistoryWidget<'a, Tz> {
    pub fn new(palettes: &'a [SavedPalette], selected: usize, now: chrono::DateTime<Tz>) -> Self {
        Self {
            palettes,
            selected,
            now,
        }
    }
}

fn history_entry(index: usize, palette: &SavedPalette, date: String, selected: bool) -> Line<'static> {
    let marker = if selected { "> " } else { "  " };
    let title_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(format!("{marker}Palette {:<3}", index + 1), title_style),
        Span::styled(format!("{date:<18}"), Style::default().fg(Color::DarkGray)),
    ];
    for color in palette.colors() {
        spans.push(Span::styled("   ", Style::default().bg(to_color(color.rgb))));
    }
    spans.push(Span::styled(
        format!("  {}", palette.image_url),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

impl<Tz> Widget for HistoryWidget<'_, Tz>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Saved Palettes (Enter open, x clear)");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.palettes.is_empty() {
            let lines = vec![
                Line::styled("  No Saved Palettes", Style::default().add_modifier(Modifier::BOLD)),
                Line::from(""),
                Line::styled(
                    "  When you save color palettes, they will appear here for future reference.",
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            Paragraph::new(lines).render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .palettes
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let date = format_timestamp(&p.timestamp, &self.now);
                history_entry(i, p, date, i == self.selected)
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
