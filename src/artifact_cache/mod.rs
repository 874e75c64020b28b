//! Bounded artifact cache
//!
//! Memoizes rendered scannable-code markup keyed by item code, under a
//! fixed total byte budget with oldest-first eviction. Rendering is pure
//! and deterministic given the code string, so content-addressed
//! memoization is safe; the only invalidation is a wholesale `clear()`
//! on data reload, because codes may be reassigned to different items.
//!
//! The cache degrades rather than fails: a storage-layer capacity error
//! disables it for the rest of the session (one-way), after clearing its
//! own namespace to reclaim space. No cache condition is ever surfaced
//! as an error to the caller.

pub mod store;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::models::CacheEntry;

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Sizing and namespacing knobs for one cache instance.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Key prefix isolating this cache's slice of the store
    pub namespace: String,
    /// Total byte budget across all live entries
    pub budget_bytes: u64,
    /// Per-entry ceiling; larger payloads are never stored
    pub entry_ceiling_bytes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            namespace: "stocklens:artifact:".to_string(),
            budget_bytes: 512 * 1024,
            entry_ceiling_bytes: 32 * 1024,
        }
    }
}

/// Creation-ordered bookkeeping for one live entry.
#[derive(Debug, Clone)]
struct IndexEntry {
    key: String,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

pub struct BoundedArtifactCache<S: KeyValueStore> {
    store: S,
    settings: CacheSettings,
    /// Live entries in creation order, oldest first
    index: Vec<IndexEntry>,
    current_size: u64,
    enabled: bool,
}

impl<S: KeyValueStore> BoundedArtifactCache<S> {
    /// Open a cache over the given store, rebuilding the in-memory index
    /// from whatever survives under this namespace. Corrupt entries are
    /// purged during the scan.
    pub fn new(store: S, settings: CacheSettings) -> Self {
        let mut cache = Self {
            store,
            settings,
            index: Vec::new(),
            current_size: 0,
            enabled: true,
        };
        cache.rebuild_index();
        cache
    }

    /// Fetch the memoized payload for a code. Never raises: a corrupt
    /// stored entry is purged and reported as absent, and a disabled
    /// cache always misses.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let storage_key = self.storage_key(key);
        let raw = self.store.get(&storage_key)?;
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry.payload),
            Err(e) => {
                debug!("Purging corrupt cache entry '{}': {}", key, e);
                self.drop_entry(key);
                None
            }
        }
    }

    /// Store a rendered payload for a code.
    ///
    /// No-op when the cache is disabled or the payload exceeds the
    /// per-entry ceiling. Evicts oldest-first until the budget has room,
    /// then writes; the running size total and the eviction pass form one
    /// uninterrupted sequence, so the total never observably exceeds the
    /// budget. A storage capacity failure flips the cache into degraded
    /// mode instead of surfacing an error.
    pub fn set(&mut self, key: &str, payload: &str) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry::new(key.to_string(), payload.to_string());
        if entry.size_bytes > self.settings.entry_ceiling_bytes {
            debug!(
                "Skipping oversized payload for '{}': {} bytes (ceiling {})",
                key, entry.size_bytes, self.settings.entry_ceiling_bytes
            );
            return;
        }

        // A re-render replaces the old entry outright
        self.drop_entry(key);

        while self.current_size + entry.size_bytes > self.settings.budget_bytes {
            let Some(oldest) = self.index.first().cloned() else {
                // Entry ceiling exceeds the whole budget; nothing to evict
                return;
            };
            debug!(
                "Evicting '{}' ({} bytes, created {}) for headroom",
                oldest.key, oldest.size_bytes, oldest.created_at
            );
            self.drop_entry(&oldest.key);
        }

        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(e) => {
                debug!("Failed to serialize cache entry for '{}': {}", key, e);
                return;
            }
        };

        let storage_key = self.storage_key(key);
        match self.store.set(&storage_key, &serialized) {
            Ok(()) => {
                self.current_size += entry.size_bytes;
                self.index.push(IndexEntry {
                    key: key.to_string(),
                    size_bytes: entry.size_bytes,
                    created_at: entry.created_at,
                });
            }
            Err(e) if e.is_capacity() => self.degrade(),
            Err(e) => {
                warn!("Cache write for '{}' failed, entry skipped: {}", key, e);
            }
        }
    }

    /// Remove every entry in this cache's namespace and reset the size
    /// counter. Keys outside the namespace are untouched.
    pub fn clear(&mut self) {
        for entry in std::mem::take(&mut self.index) {
            let storage_key = self.storage_key(&entry.key);
            self.store.remove(&storage_key);
        }
        self.current_size = 0;
    }

    /// Sweep entries whose age exceeds the threshold. Independent of the
    /// size-based eviction path; ages are measured from creation, not
    /// last access.
    pub fn evict_older_than(&mut self, max_age: Duration) {
        let cutoff = Utc::now() - max_age;
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|e| e.created_at < cutoff)
            .map(|e| e.key.clone())
            .collect();
        for key in expired {
            debug!("Sweeping expired cache entry '{}'", key);
            self.drop_entry(&key);
        }
    }

    /// Total bytes across live entries; equals the sum of every entry's
    /// `size_bytes` at all times.
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// False once a storage capacity failure has put the cache into
    /// degraded mode; there is no way back within a session.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read-only view of the backing store, for stats and tests.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.settings.namespace, key)
    }

    fn drop_entry(&mut self, key: &str) {
        if let Some(pos) = self.index.iter().position(|e| e.key == key) {
            let entry = self.index.remove(pos);
            self.current_size -= entry.size_bytes;
            let storage_key = self.storage_key(key);
            self.store.remove(&storage_key);
        }
    }

    fn degrade(&mut self) {
        warn!("Cache storage reported capacity exhaustion; clearing namespace and disabling cache");
        self.clear();
        self.enabled = false;
    }

    fn rebuild_index(&mut self) {
        let prefix = self.settings.namespace.clone();
        let mut entries: Vec<IndexEntry> = Vec::new();
        for storage_key in self.store.keys() {
            let Some(key) = storage_key.strip_prefix(&prefix) else {
                continue;
            };
            let Some(raw) = self.store.get(&storage_key) else {
                continue;
            };
            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => entries.push(IndexEntry {
                    key: key.to_string(),
                    size_bytes: entry.size_bytes,
                    created_at: entry.created_at,
                }),
                Err(e) => {
                    debug!("Purging corrupt cache entry '{}' on open: {}", key, e);
                    self.store.remove(&storage_key);
                }
            }
        }
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.current_size = entries.iter().map(|e| e.size_bytes).sum();
        self.index = entries;
    }
}
