//! Persistence boundary for the artifact cache
//!
//! A namespaced key -> string store. The cache only ever touches keys
//! under its own prefix, so unrelated data sharing the store survives a
//! cache `clear()`.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::StorageError;

/// Minimal key/value contract the cache persists through.
///
/// `set` may fail with `StorageError::CapacityExceeded` when the medium
/// itself is out of space; that is distinct from the cache's own byte
/// budget, which the cache enforces before ever calling `set`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory store, optionally capped at a total byte capacity.
///
/// The cap exists to exercise the cache's degraded mode in tests; an
/// uncapped store never rejects a write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bytes(capacity_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn used_bytes(&self) -> u64 {
        self.entries
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity_bytes {
            let replaced = self.entries.get(key).map(|v| v.len() as u64).unwrap_or(0);
            let after = self.used_bytes() - replaced + value.len() as u64;
            if after > capacity {
                return Err(StorageError::capacity_exceeded(key));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// File-backed store: one JSON document holding the whole key space,
/// loaded eagerly and rewritten on every mutation.
///
/// Cached artifacts are small and the store is process-local
/// single-writer, so a whole-document rewrite is adequate.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    // An unreadable store document is a cold start, not a
                    // fatal condition.
                    debug!("Discarding unreadable store file {:?}: {}", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, contents).map_err(|e| {
            if e.raw_os_error() == Some(28) {
                // ENOSPC maps to the capacity contract
                StorageError::capacity_exceeded(self.path.to_string_lossy())
            } else {
                StorageError::Io(e)
            }
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        match self.persist() {
            Ok(()) => Ok(()),
            Err(e) => {
                // Keep the in-memory view consistent with disk
                self.entries.remove(key);
                Err(e)
            }
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Err(e) = self.persist() {
            debug!("Failed to persist removal of '{}': {}", key, e);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
