//! Permanent cache facade composing store, purge policy, and configuration.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::path::{database_path, StorageLocation};
use crate::cache::purge::PurgeQueries;
use crate::cache::stats::CacheStats;
use crate::cache::store::TileStore;
use crate::cache::types::{CacheConfig, InitError, PurgeStrategy, StorageError, TileKey};
use crate::time::now_millis;

/// State guarded by the cache's single critical section.
struct Inner {
    store: TileStore,
    config: CacheConfig,
    stats: CacheStats,
}

/// Durable tile cache surviving process restarts.
///
/// Composes the SQLite [`TileStore`] with a purge policy and a runtime
/// configuration. Every public operation takes one exclusive critical
/// section, so concurrent callers never observe a half-applied write, and a
/// `store` call's write plus its purge pass form one atomic unit: a
/// concurrent `fetch` sees the entry either before the write or fully after
/// the purge, never in between.
///
/// The cache never fetches tiles itself; on a miss, `fetch` returns
/// `Ok(None)` and the caller's fetch pipeline is expected to supply the
/// bytes via [`store`](PermanentCache::store).
///
/// # Example
///
/// ```ignore
/// use tilevault::cache::{CacheConfig, PermanentCache, StorageLocation, TileKey};
///
/// let cache = PermanentCache::open(StorageLocation::AppData, CacheConfig::default())?;
/// let key = TileKey::new("osm", 15, 5279, 12754);
///
/// if let Some(bytes) = cache.fetch(&key)? {
///     // render the tile
/// } else {
///     let bytes = download_tile(&key)?;
///     cache.store(key, &bytes)?;
/// }
/// ```
pub struct PermanentCache {
    inner: Mutex<Inner>,
}

impl PermanentCache {
    /// Open the cache at the resolved path for a storage location.
    ///
    /// The database file is created on first use. Fails with [`InitError`]
    /// if no base directory is resolvable or the file cannot be opened.
    pub fn open(location: StorageLocation, config: CacheConfig) -> Result<Self, InitError> {
        let path = database_path(location)?;
        Self::open_at(path, config)
    }

    /// Open the cache at an explicit database path.
    pub fn open_at(path: impl AsRef<Path>, config: CacheConfig) -> Result<Self, InitError> {
        let store = TileStore::open(path)?;

        debug!(
            path = %store.path().display(),
            capacity = config.capacity,
            minimal_purge = config.minimal_purge,
            "permanent cache opened"
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                store,
                config,
                stats: CacheStats::new(),
            }),
        })
    }

    /// Look up a tile.
    ///
    /// On a hit, refreshes the entry's last-access time and returns the
    /// bytes. A miss is `Ok(None)`, never an error; errors mean the cache
    /// itself is unusable for this operation.
    pub fn fetch(&self, key: &TileKey) -> Result<Option<Vec<u8>>, StorageError> {
        let mut inner = self.inner.lock().unwrap();

        match inner.store.get(key)? {
            Some(data) => {
                inner.store.touch(key, now_millis())?;
                inner.stats.record_hit();
                Ok(Some(data))
            }
            None => {
                inner.stats.record_miss();
                Ok(None)
            }
        }
    }

    /// Store a tile, then run a purge pass before returning.
    ///
    /// The purge pass may delete other, unrelated entries as a side effect
    /// of the same call. A purge failure is returned as the call's error but
    /// never rolls back the already-committed write: the new entry remains
    /// valid and the cache stays functional, possibly temporarily over
    /// capacity.
    pub fn store(&self, key: TileKey, data: &[u8]) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let now = now_millis();

        inner.store.put(&key, data, now)?;
        inner.stats.record_write();

        if let Err(e) = Self::purge_locked(&mut inner, now) {
            warn!(
                key = %key,
                error = %e,
                "purge pass failed after write; cache may temporarily exceed capacity"
            );
            return Err(e);
        }

        Ok(())
    }

    /// Remove a single tile. Returns whether an entry was removed.
    pub fn remove(&self, key: &TileKey) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.store.delete(std::slice::from_ref(key))?;
        inner.stats.record_removes(removed as u64);
        Ok(removed > 0)
    }

    /// Remove every tile.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.store.count_entries()?;
        inner.store.clear_all()?;
        inner.stats.record_removes(count);

        debug!(removed = count, "cache cleared");
        Ok(())
    }

    /// Run one purge pass now with the current configuration.
    ///
    /// Returns the number of tiles evicted. `store` already purges on every
    /// write; this exists for operators reclaiming space on demand.
    pub fn purge(&self) -> Result<usize, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        Self::purge_locked(&mut inner, now_millis())
    }

    /// Set the purge strategy. Takes effect on the next purge pass.
    pub fn set_purge_strategy(&self, strategy: PurgeStrategy) {
        self.inner.lock().unwrap().config.strategy = strategy;
    }

    /// Set the maximum tile count. Takes effect on the next purge pass.
    pub fn set_capacity(&self, capacity: u64) {
        self.inner.lock().unwrap().config.capacity = capacity;
    }

    /// Set the minimum number of tiles removed per purge pass.
    pub fn set_minimal_purge(&self, minimal_purge: u64) {
        self.inner.lock().unwrap().config.minimal_purge = minimal_purge;
    }

    /// Set the expiry period. Zero disables time-based expiry.
    pub fn set_expiry_period(&self, expiry_period: Duration) {
        self.inner.lock().unwrap().config.expiry_period = expiry_period;
    }

    /// Number of tiles currently stored.
    pub fn len(&self) -> Result<u64, StorageError> {
        self.inner.lock().unwrap().store.count_entries()
    }

    /// Whether the cache holds no tiles.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().unwrap().stats.clone()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> CacheConfig {
        self.inner.lock().unwrap().config.clone()
    }

    /// Path of the backing database file.
    pub fn path(&self) -> PathBuf {
        self.inner.lock().unwrap().store.path().to_path_buf()
    }

    /// Purge pass body; caller holds the critical section.
    fn purge_locked(inner: &mut Inner, now: i64) -> Result<usize, StorageError> {
        let policy = inner.config.strategy.policy();
        let victims = policy.select_for_eviction(&inner.store, &inner.config, now)?;
        if victims.is_empty() {
            return Ok(0);
        }

        let removed = inner.store.delete(&victims)?;
        inner.stats.record_evictions(removed as u64);

        debug!(evicted = removed, "purge pass complete");
        Ok(removed)
    }
}
