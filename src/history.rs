use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::PersistenceError;
use crate::palette::SavedPalette;

/// Durable slot holding the history.
pub const STORAGE_KEY: &str = "color-palette-history";
/// Saved palettes kept; older ones are evicted.
pub const MAX_HISTORY: usize = 12;

/// A durable string key-value slot store.
pub trait SlotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    /// Delete the slot. Removing a missing slot is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.slot_path(key);
        std::fs::write(&path, value).map_err(|source| PersistenceError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }
}

/// In-memory slots. Clones share the same map, so a second store built from
/// a clone sees what the first one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, like a browser store over quota.
    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.reject_writes {
            return Err(PersistenceError::WriteRejected(key.to_string()));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Saved palettes, most recent first, mirrored to a durable slot.
///
/// The in-memory list is authoritative for the running process. Storage is
/// a best-effort copy: an unreadable slot loads as empty, entries that
/// don't decode are dropped one by one, and write failures are logged,
/// never returned. Mutations take `&mut self`; callers sharing the
/// store across threads wrap it in a `Mutex` so each mutate-then-persist
/// runs as one step.
pub struct PaletteHistoryStore {
    storage: Box<dyn SlotStorage + Send>,
    palettes: Vec<SavedPalette>,
}

impl PaletteHistoryStore {
    /// Build the store from whatever the slot currently holds.
    pub fn load(storage: impl SlotStorage + Send + 'static) -> Self {
        let palettes = match read_history(&storage) {
            Ok(palettes) => {
                tracing::debug!(count = palettes.len(), "loaded palette history");
                palettes
            }
            Err(e) => {
                tracing::warn!(
                    %e,
                    key = STORAGE_KEY,
                    "failed to load palette history, starting empty"
                );
                Vec::new()
            }
        };
        Self {
            storage: Box::new(storage),
            palettes,
        }
    }

    /// Prepend `palette`, evict past [`MAX_HISTORY`], and persist the list.
    pub fn save(&mut self, palette: SavedPalette) {
        self.palettes.insert(0, palette);
        self.palettes.truncate(MAX_HISTORY);

        if let Err(e) = self.persist() {
            tracing::warn!(%e, key = STORAGE_KEY, "failed to persist palette history");
        }
    }

    /// Forget every saved palette and delete the durable slot.
    pub fn clear(&mut self) {
        self.palettes.clear();
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            tracing::warn!(%e, key = STORAGE_KEY, "failed to remove palette history");
        }
    }

    pub fn list(&self) -> &[SavedPalette] {
        &self.palettes
    }

    pub fn get(&self, index: usize) -> Option<&SavedPalette> {
        self.palettes.get(index)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&self.palettes)?;
        self.storage.write(STORAGE_KEY, &json)
    }
}

fn read_history(storage: &dyn SlotStorage) -> Result<Vec<SavedPalette>, PersistenceError> {
    let Some(json) = storage.read(STORAGE_KEY)? else {
        return Ok(Vec::new());
    };
    let entries: Vec<serde_json::Value> = serde_json::from_str(&json)?;
    let mut palettes: Vec<SavedPalette> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(palette) => Some(palette),
            Err(e) => {
                tracing::warn!(%e, index, key = STORAGE_KEY, "dropping unreadable history entry");
                None
            }
        })
        .collect();
    palettes.truncate(MAX_HISTORY);
    Ok(palettes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::palette::ExtractedPalette;
    use crate::pipeline::extract::ExtractedColor;
    use chrono::{TimeZone, Utc};

    fn saved(n: u32) -> SavedPalette {
        let palette = ExtractedPalette {
            source_image: format!("image-{n}.png"),
            colors: vec![ExtractedColor::new(Color::new(32, 64, 96), n + 1)],
        };
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::minutes(n.into());
        SavedPalette::new(palette, format!("image-{n}.png"), at)
    }

    fn sources(store: &PaletteHistoryStore) -> Vec<String> {
        store
            .list()
            .iter()
            .map(|p| p.palette.source_image.clone())
            .collect()
    }

    #[test]
    fn starts_empty_without_slot() {
        let store = PaletteHistoryStore::load(MemoryStorage::new());
        assert!(store.is_empty());
    }

    #[test]
    fn save_prepends() {
        let mut store = PaletteHistoryStore::load(MemoryStorage::new());
        store.save(saved(1));
        store.save(saved(2));
        assert_eq!(sources(&store), vec!["image-2.png", "image-1.png"]);
        assert_eq!(store.get(0), Some(&saved(2)));
    }

    #[test]
    fn thirteen_saves_keep_twelve_newest() {
        let mut store = PaletteHistoryStore::load(MemoryStorage::new());
        for n in 1..=13 {
            store.save(saved(n));
        }
        assert_eq!(store.len(), MAX_HISTORY);
        let expected: Vec<String> = (2..=13).rev().map(|n| format!("image-{n}.png")).collect();
        assert_eq!(sources(&store), expected);
    }

    #[test]
    fn saves_survive_reload() {
        let storage = MemoryStorage::new();
        let mut store = PaletteHistoryStore::load(storage.clone());
        store.save(saved(1));
        store.save(saved(2));

        let reloaded = PaletteHistoryStore::load(storage);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn clear_deletes_slot() {
        let storage = MemoryStorage::new();
        let mut store = PaletteHistoryStore::load(storage.clone());
        store.save(saved(1));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(storage.read(STORAGE_KEY).unwrap(), None);
        assert!(PaletteHistoryStore::load(storage).is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, "{not json").unwrap();
        assert!(PaletteHistoryStore::load(storage).is_empty());
    }

    #[test]
    fn non_list_slot_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, r#"{"sourceImage": "x"}"#).unwrap();
        assert!(PaletteHistoryStore::load(storage).is_empty());
    }

    #[test]
    fn malformed_entry_is_dropped_and_rest_survive() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PaletteHistoryStore::load(FileStorage::new(dir.path()));
        for n in 1..=5 {
            store.save(saved(n));
        }

        let path = dir.path().join("color-palette-history.json");
        let mut entries: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        entries[4].as_object_mut().unwrap().remove("timestamp");
        std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

        let mut reloaded = PaletteHistoryStore::load(FileStorage::new(dir.path()));
        assert_eq!(
            sources(&reloaded),
            vec!["image-5.png", "image-4.png", "image-3.png", "image-2.png"]
        );

        reloaded.save(saved(6));
        let on_disk: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 5);
    }

    #[test]
    fn entry_with_mismatched_hex_is_dropped() {
        let mut storage = MemoryStorage::new();
        let mut entries = serde_json::to_value(vec![saved(1), saved(2)]).unwrap();
        entries[0]["colors"][0]["hex"] = serde_json::json!("#ffffff");
        storage
            .write(STORAGE_KEY, &entries.to_string())
            .unwrap();

        let store = PaletteHistoryStore::load(storage);
        assert_eq!(sources(&store), vec!["image-2.png"]);
    }

    #[test]
    fn oversized_slot_is_trimmed_on_load() {
        let mut storage = MemoryStorage::new();
        let many: Vec<SavedPalette> = (0..20).map(saved).collect();
        storage
            .write(STORAGE_KEY, &serde_json::to_string(&many).unwrap())
            .unwrap();
        assert_eq!(PaletteHistoryStore::load(storage).len(), MAX_HISTORY);
    }

    #[test]
    fn rejected_write_keeps_in_memory_state() {
        let storage = MemoryStorage::new().rejecting_writes();
        let mut store = PaletteHistoryStore::load(storage.clone());
        store.save(saved(1));

        assert_eq!(store.len(), 1);
        // Nothing reached durable storage, so a restart loses it
        assert!(PaletteHistoryStore::load(storage).is_empty());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let history_dir = dir.path().join("nested").join("history");

        let mut store = PaletteHistoryStore::load(FileStorage::new(&history_dir));
        store.save(saved(7));
        assert!(history_dir.join("color-palette-history.json").exists());

        let reloaded = PaletteHistoryStore::load(FileStorage::new(&history_dir));
        assert_eq!(reloaded.list(), &[saved(7)]);
    }

    #[test]
    fn file_storage_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PaletteHistoryStore::load(FileStorage::new(dir.path()));
        store.save(saved(1));
        store.clear();

        assert!(!dir.path().join("color-palette-history.json").exists());
        assert!(PaletteHistoryStore::load(FileStorage::new(dir.path())).is_empty());
    }

    #[test]
    fn file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert!(storage.remove(STORAGE_KEY).is_ok());
        assert_eq!(storage.read(STORAGE_KEY).unwrap(), None);
    }
}
