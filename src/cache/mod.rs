//! In-memory TTL cache for assembled dashboard snapshots.
//!
//! Dashboard reads fan out across several tables, so assembled payloads are
//! kept for a short window (`dashboard_cache_ttl_secs`). Any write that can
//! change a snapshot calls [`SnapshotCache::invalidate_all`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Instant::now() > expires_at
        } else {
            false
        }
    }
}

/// Snapshot cache shared across dashboard handlers. A `ttl` of `None`
/// disables caching entirely, so every read recomputes.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Option<Duration>,
}

impl SnapshotCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Fetch and deserialize a snapshot. Expired entries are dropped on read.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if self.ttl.is_none() {
            return Ok(None);
        }

        let store = self
            .store
            .read()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                drop(store);
                let mut store = self
                    .store
                    .write()
                    .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
                store.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(serde_json::from_str(&entry.value)?)),
            None => Ok(None),
        }
    }

    /// Store a snapshot under the configured TTL. No-op when caching is off.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let Some(ttl) = self.ttl else {
            return Ok(());
        };

        let serialized = serde_json::to_string(value)?;
        let mut store = self
            .store
            .write()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        store.insert(key.to_string(), CacheEntry::new(serialized, Some(ttl)));
        Ok(())
    }

    pub fn invalidate(&self, key: &str) {
        if let Ok(mut store) = self.store.write() {
            store.remove(key);
        }
    }

    /// Drop every snapshot. Called after any write that can change one.
    pub fn invalidate_all(&self) {
        if let Ok(mut store) = self.store.write() {
            store.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Snapshot {
        active_campaigns: u64,
    }

    #[test]
    fn round_trips_typed_values() {
        let cache = SnapshotCache::new(Some(Duration::from_secs(30)));
        cache
            .set("ops_status", &Snapshot { active_campaigns: 12 })
            .unwrap();

        let got: Option<Snapshot> = cache.get("ops_status").unwrap();
        assert_eq!(got, Some(Snapshot { active_campaigns: 12 }));
    }

    #[test]
    fn disabled_cache_never_stores() {
        let cache = SnapshotCache::disabled();
        cache
            .set("ops_status", &Snapshot { active_campaigns: 1 })
            .unwrap();

        let got: Option<Snapshot> = cache.get("ops_status").unwrap();
        assert!(got.is_none());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = SnapshotCache::new(Some(Duration::from_millis(10)));
        cache
            .set("platform_health", &Snapshot { active_campaigns: 3 })
            .unwrap();

        std::thread::sleep(Duration::from_millis(30));
        let got: Option<Snapshot> = cache.get("platform_health").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn invalidate_all_clears_every_key() {
        let cache = SnapshotCache::new(Some(Duration::from_secs(30)));
        cache
            .set("ops_status", &Snapshot { active_campaigns: 5 })
            .unwrap();
        cache
            .set("data_gaps", &Snapshot { active_campaigns: 2 })
            .unwrap();

        cache.invalidate_all();

        let a: Option<Snapshot> = cache.get("ops_status").unwrap();
        let b: Option<Snapshot> = cache.get("data_gaps").unwrap();
        assert!(a.is_none());
        assert!(b.is_none());
    }
}
