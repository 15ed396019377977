//! Storage Backends
//!
//! The trait is the seam between the registries and persistence; the file
//! backend keeps one JSON file per key, the in-memory backend serves tests
//! and cold starts without a data directory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::{DomainError, DomainResult};

/// Key-value string storage.
pub trait StorageBackend {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> DomainResult<()>;
}

/// Volatile in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// File-backed storage: `<dir>/<key>.json` per key.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the data directory.
    pub fn new(dir: impl Into<PathBuf>) -> DomainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| DomainError::Storage(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(format!("read {}: {}", path.display(), e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|e| DomainError::Storage(format!("write {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(format!("remove {}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));

        storage.set("k", "w").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("w".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.get("category_settings").unwrap(), None);
        storage.set("category_settings", r#"{"version":"2.0"}"#).unwrap();
        assert_eq!(
            storage.get("category_settings").unwrap(),
            Some(r#"{"version":"2.0"}"#.to_string())
        );

        // A second handle over the same directory sees the write
        let other = FileStorage::new(dir.path()).unwrap();
        assert!(other.get("category_settings").unwrap().is_some());

        storage.remove("category_settings").unwrap();
        assert_eq!(storage.get("category_settings").unwrap(), None);
        // Removing twice is fine
        storage.remove("category_settings").unwrap();
    }
}
