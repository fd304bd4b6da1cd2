//! Durable tile cache with configurable purge policies.
//!
//! Tiles are opaque byte blobs addressed by [`TileKey`] (source, zoom,
//! column, row), persisted in a single SQLite database so they survive
//! process restarts, and bounded by count-based or age-based eviction.

mod manager;
mod path;
mod purge;
mod stats;
mod store;
mod types;

pub use manager::PermanentCache;
pub use path::{database_path, StorageLocation, DATABASE_FILE};
pub use purge::{CountBasedPurge, PurgePolicy, PurgeQueries, TimeBasedPurge};
pub use stats::CacheStats;
pub use store::TileStore;
pub use types::{
    CacheConfig, InitError, PurgeStrategy, StorageError, TileKey, DEFAULT_CAPACITY,
    DEFAULT_MINIMAL_PURGE,
};
