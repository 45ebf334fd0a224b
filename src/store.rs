//! Key-Value Store
//!
//! The page persists exactly two things: the theme choice and the set of
//! completed sections. Both are strings under fixed keys, so the storage
//! interface is a plain string map.
//!
//! - [`MemoryStore`]: in-process map, for tests and ephemeral sessions
//! - [`FileStore`]: the same map saved as a JSON object on disk

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// String-keyed persistent storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Non-persistent store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON file
///
/// The whole map is rewritten on every change; it only ever holds a couple of
/// short entries.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// The in-memory map only changes if the file write succeeds
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(err) = self.save() {
                self.entries.insert(key.to_string(), old);
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("theme", "dark").unwrap();
        store.set("completedSections", "[\"intro\"]").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
        assert_eq!(reopened.get("completedSections").as_deref(), Some("[\"intro\"]"));
    }

    #[test]
    fn test_file_store_unchanged_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("prefs.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.set("theme", "light").is_err());
        assert_eq!(store.get("theme"), None);

        fs::create_dir(dir.path().join("missing")).unwrap();
        store.set("theme", "light").unwrap();
        fs::remove_dir_all(dir.path().join("missing")).unwrap();

        assert!(store.set("theme", "dark").is_err());
        assert!(store.remove("theme").is_err());
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
