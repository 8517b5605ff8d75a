//! Durable key-value storage backing the request queue.

use crate::error::StorageError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Survives store re-creation, not process restarts.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    fn lock_inner(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Poisoned("memory storage"))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock_inner()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock_inner()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock_inner()?.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a root directory: `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.split('/').filter(|s| !s.is_empty() && *s != "." && *s != "..") {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io { key: key.to_string(), source }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path).map(Some).map_err(|e| io_error(key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(key, e))?;
        }
        // Write-then-rename so a crash never leaves a truncated queue file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);
        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_paths_stay_under_root() {
        let storage = FileStorage::new("/tmp/beesign-root");
        assert_eq!(
            storage.path_for("sign-requests/pending"),
            PathBuf::from("/tmp/beesign-root/sign-requests/pending.json")
        );
        assert_eq!(
            storage.path_for("../../etc/passwd"),
            PathBuf::from("/tmp/beesign-root/etc/passwd.json")
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        storage.set("queue/pending", "[]").expect("set");
        assert_eq!(storage.get("queue/pending").expect("get").as_deref(), Some("[]"));
        storage.remove("queue/pending").expect("remove");
        storage.remove("queue/pending").expect("remove twice");
        assert_eq!(storage.get("queue/pending").expect("get"), None);
    }
}
