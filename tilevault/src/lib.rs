//! TileVault - Durable map tile cache
//!
//! This library provides a persistent cache for map tiles: opaque tile
//! bytes addressed by source, zoom, and column/row, stored in a single
//! SQLite database file and bounded by configurable purge policies
//! (count-based and age-based).
//!
//! The cache is a synchronous, in-process component with no background
//! threads: purging runs inline after every store, and all operations are
//! safe to call from concurrent threads. Tile fetching, rendering, and
//! display are external collaborators; on a miss the caller supplies the
//! bytes.
//!
//! # High-Level API
//!
//! ```ignore
//! use tilevault::cache::{CacheConfig, PermanentCache, StorageLocation, TileKey};
//!
//! let cache = PermanentCache::open(StorageLocation::AppData, CacheConfig::default())?;
//! let key = TileKey::new("osm", 15, 5279, 12754);
//!
//! match cache.fetch(&key)? {
//!     Some(bytes) => render(bytes),
//!     None => {
//!         let bytes = download(&key)?;
//!         cache.store(key, &bytes)?;
//!     }
//! }
//! ```

pub mod cache;
pub mod logging;
pub mod time;

/// Version of the TileVault library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
