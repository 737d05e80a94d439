use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_COLOR_COUNT, HISTORY_DIR_ENV};
use crate::export::ExportFormat;

/// Extract dominant color palettes from images and keep a history of them.
#[derive(Parser, Debug)]
#[command(name = "chromapick", version, about)]
pub struct Args {
    /// Directory holding saved palette history
    #[arg(long, global = true, env = HISTORY_DIR_ENV)]
    pub history_dir: Option<PathBuf>,

    /// Keep history in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the dominant colors of an image
    Extract {
        /// Path to the input image
        image: PathBuf,

        /// Number of colors to extract
        #[arg(short = 'k', long = "colors", default_value_t = DEFAULT_COLOR_COUNT)]
        colors: usize,

        /// Print as CSS or SCSS instead of a color list
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Write the export to this file instead of stdout (implies --format css if unset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the palette to history
        #[arg(long)]
        save: bool,

        /// Print a colored terminal preview of the palette
        #[arg(long)]
        preview: bool,
    },

    /// Browse or clear saved palettes
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Launch interactive TUI mode
    Tui {
        /// Image to open on start
        image: Option<PathBuf>,

        /// Initial number of colors (3-7)
        #[arg(short = 'k', long = "colors", default_value_t = DEFAULT_COLOR_COUNT)]
        colors: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List saved palettes, most recent first
    List,

    /// Print one saved palette
    Show {
        /// Position in the list, starting at 1
        index: usize,

        /// Print as CSS or SCSS instead of a color list
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Print a colored terminal preview of the palette
        #[arg(long)]
        preview: bool,
    },

    /// Delete all saved palettes
    Clear,
}
