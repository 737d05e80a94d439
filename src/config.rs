use std::path::{Path, PathBuf};

use crate::history::{FileStorage, MemoryStorage, PaletteHistoryStore};

/// Colors extracted when no count is given.
pub const DEFAULT_COLOR_COUNT: usize = 5;
/// Smallest count the interactive UI offers.
pub const MIN_COLOR_COUNT: usize = 3;
/// Largest count the interactive UI offers.
pub const MAX_COLOR_COUNT: usize = 7;

/// Env var overriding the history directory.
pub const HISTORY_DIR_ENV: &str = "CHROMAPICK_HISTORY_DIR";

/// Resolved runtime settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub history_dir: PathBuf,
    /// Keep history in memory only for this run.
    pub ephemeral: bool,
}

impl Settings {
    /// Use `history_dir` if given, otherwise the default data directory.
    pub fn resolve(history_dir: Option<&Path>, ephemeral: bool) -> Self {
        let history_dir = history_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_history_dir);
        Self {
            history_dir,
            ephemeral,
        }
    }

    pub fn open_history(&self) -> PaletteHistoryStore {
        if self.ephemeral {
            tracing::debug!("using in-memory palette history");
            PaletteHistoryStore::load(MemoryStorage::new())
        } else {
            tracing::debug!(dir = %self.history_dir.display(), "using file palette history");
            PaletteHistoryStore::load(FileStorage::new(&self.history_dir))
        }
    }
}

/// `$XDG_DATA_HOME/chromapick`, falling back to `~/.local/share/chromapick`.
pub fn default_history_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    data_home.join("chromapick")
}

/// Clamp a count to the range the interactive UI offers.
pub fn clamp_color_count(count: usize) -> usize {
    count.clamp(MIN_COLOR_COUNT, MAX_COLOR_COUNT)
}
