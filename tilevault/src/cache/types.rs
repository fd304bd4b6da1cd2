//! Core types for the tile cache.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cache::path::StorageLocation;

/// Default maximum tile count before purging begins.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Default minimum number of tiles removed per purge pass.
pub const DEFAULT_MINIMAL_PURGE: u64 = 100;

/// Key uniquely identifying a cached tile.
///
/// Includes all parameters needed to address the tile:
/// source identifier, zoom level, and column/row coordinates.
/// Two keys differing in any field are distinct cache entries.
///
/// # Example
///
/// ```
/// use tilevault::cache::TileKey;
///
/// let key = TileKey::new("osm", 15, 5279, 12754);
/// assert_eq!(key.source, "osm");
/// assert_eq!(key.zoom, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Source identifier (e.g., "osm", "satellite")
    pub source: String,
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
}

impl TileKey {
    /// Create a new tile key.
    pub fn new(source: impl Into<String>, zoom: u8, col: u32, row: u32) -> Self {
        Self {
            source: source.into(),
            zoom,
            col,
            row,
        }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.source, self.zoom, self.col, self.row)
    }
}

/// Strategy deciding which entries a purge pass selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeStrategy {
    /// Evict the oldest entries by last access once the capacity is exceeded.
    CountBased,
    /// Evict entries older than the expiry period, then fall back to
    /// count-based eviction if the remainder still exceeds capacity.
    TimeBased,
}

/// Runtime cache configuration.
///
/// Owned by a cache instance, never global, so multiple caches (e.g. one per
/// map source) can coexist with independent policies. All fields may be
/// changed at runtime through the cache's setters; changes take effect on the
/// next store-triggered purge pass.
///
/// A `minimal_purge` larger than `capacity` is legal and simply empties the
/// cache faster.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tilevault::cache::{CacheConfig, PurgeStrategy};
///
/// let config = CacheConfig::default()
///     .with_strategy(PurgeStrategy::TimeBased)
///     .with_capacity(5000)
///     .with_expiry_period(Duration::from_secs(7 * 24 * 3600));
///
/// assert_eq!(config.capacity, 5000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Active purge strategy
    pub strategy: PurgeStrategy,
    /// Maximum tile count the cache tries to maintain
    pub capacity: u64,
    /// Minimum number of tiles removed per purge pass
    pub minimal_purge: u64,
    /// Maximum age since last access before a tile is eligible for removal.
    /// Zero disables time-based expiry (count-based behavior applies).
    pub expiry_period: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            strategy: PurgeStrategy::CountBased,
            capacity: DEFAULT_CAPACITY,
            minimal_purge: DEFAULT_MINIMAL_PURGE,
            expiry_period: Duration::ZERO,
        }
    }
}

impl CacheConfig {
    /// Set the purge strategy.
    pub fn with_strategy(mut self, strategy: PurgeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the maximum tile count.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the minimum number of tiles removed per purge pass.
    pub fn with_minimal_purge(mut self, minimal_purge: u64) -> Self {
        self.minimal_purge = minimal_purge;
        self
    }

    /// Set the expiry period. Zero disables time-based expiry.
    pub fn with_expiry_period(mut self, expiry_period: Duration) -> Self {
        self.expiry_period = expiry_period;
        self
    }
}

/// Errors raised while creating or opening the backing database.
///
/// These are fatal to cache construction: no cache instance exists when one
/// of them is returned.
#[derive(Debug, Error)]
pub enum InitError {
    /// No base directory could be resolved for the chosen storage location
    #[error("no base directory available for {location} storage")]
    NoBaseDirectory { location: StorageLocation },

    /// The directory holding the database could not be created
    #[error("failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database file could not be opened
    #[error("failed to open tile database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The schema could not be created, typically because the existing file
    /// is corrupt or not a database
    #[error("failed to initialize tile database schema: {0}")]
    Schema(#[source] rusqlite::Error),
}

/// Error raised by a single storage operation.
///
/// Non-fatal: the cache remains usable for subsequent calls. A cache miss is
/// never represented as an error; `fetch` returns `Ok(None)` for misses.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying database rejected or failed the operation
    #[error("tile database error: {0}")]
    Database(#[from] rusqlite::Error),
}
