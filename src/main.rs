use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chromapick::cli::{Args, Command, HistoryAction};
use chromapick::config::Settings;
use chromapick::date::format_timestamp_local;
use chromapick::export::ExportFormat;
use chromapick::palette::SavedPalette;
use chromapick::pipeline::decode::ImageSource;
use chromapick::pipeline::extract::{extract_palette, ExtractedColor};
use chromapick::preview::write_preview;
use chromapick::tui::{self, TuiApp};

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chromapick=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let settings = Settings::resolve(args.history_dir.as_deref(), args.ephemeral);

    match args.command {
        Command::Extract {
            image,
            colors,
            format,
            output,
            save,
            preview,
        } => {
            let source = ImageSource::Path(image);
            let palette = extract_palette(&source, colors)
                .with_context(|| format!("failed to extract colors from {source}"))?;

            if palette.colors.is_empty() {
                eprintln!("chromapick: no colors found (image is transparent, black, or empty)");
            }

            match (output, format) {
                (Some(path), format) => {
                    let exporter = format.unwrap_or_default().exporter();
                    exporter.write_to(&palette.colors, &path)?;
                    eprintln!("Wrote {} to {}", exporter.name(), path.display());
                }
                (None, Some(format)) => print_export(format, &palette.colors)?,
                (None, None) => print_colors(&palette.colors)?,
            }

            if preview {
                write_preview(&mut std::io::stdout().lock(), &palette.colors)?;
            }

            if save {
                let mut history = settings.open_history();
                let image_url = palette.source_image.clone();
                history.save(SavedPalette::new(palette, image_url, chrono::Utc::now()));
                eprintln!("Saved palette ({} in history)", history.len());
            }
        }
        Command::History { action } => {
            let mut history = settings.open_history();
            match action {
                HistoryAction::List => {
                    if history.is_empty() {
                        println!("No saved palettes");
                    }
                    for (i, saved) in history.list().iter().enumerate() {
                        print_history_entry(i, saved);
                    }
                }
                HistoryAction::Show {
                    index,
                    format,
                    preview,
                } => {
                    let Some(saved) = index.checked_sub(1).and_then(|i| history.get(i)) else {
                        bail!(
                            "no saved palette #{index} (history has {} entries)",
                            history.len()
                        );
                    };
                    match format {
                        Some(format) => print_export(format, saved.colors())?,
                        None => {
                            print_history_entry(index - 1, saved);
                            print_colors(saved.colors())?;
                        }
                    }
                    if preview {
                        write_preview(&mut std::io::stdout().lock(), saved.colors())?;
                    }
                }
                HistoryAction::Clear => {
                    let count = history.len();
                    history.clear();
                    println!("Cleared {count} saved palettes");
                }
            }
        }
        Command::Tui { image, colors } => {
            let mut app = TuiApp::new(settings.open_history(), colors);
            if let Some(path) = image {
                app.open_image(path);
            }
            tui::run(app)?;
        }
    }

    Ok(())
}

fn print_colors(colors: &[ExtractedColor]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for color in colors {
        writeln!(
            out,
            "{}  rgb({}, {}, {})  {}",
            color.hex, color.rgb.r, color.rgb.g, color.rgb.b, color.count
        )?;
    }
    Ok(())
}

fn print_export(format: ExportFormat, colors: &[ExtractedColor]) -> Result<()> {
    let code = format.exporter().serialize(colors);
    let mut out = std::io::stdout().lock();
    out.write_all(code.as_bytes())?;
    if !code.is_empty() && !code.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn print_history_entry(index: usize, saved: &SavedPalette) {
    let hexes: Vec<&str> = saved.colors().iter().map(|c| c.hex.as_str()).collect();
    println!(
        "{:>2}. {:<18} {}  {}",
        index + 1,
        format_timestamp_local(&saved.timestamp),
        hexes.join(" "),
        saved.image_url
    );
}
