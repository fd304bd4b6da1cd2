//! Tile database management commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use tilevault::cache::{
    CacheConfig, PermanentCache, PurgeStrategy, DEFAULT_CAPACITY, DEFAULT_MINIMAL_PURGE,
};

use crate::error::CliError;

/// Purge strategy selection on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Evict the oldest tiles once the capacity is exceeded
    CountBased,
    /// Evict tiles older than the expiry period, then fall back to
    /// count-based eviction
    TimeBased,
}

impl From<StrategyArg> for PurgeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CountBased => PurgeStrategy::CountBased,
            StrategyArg::TimeBased => PurgeStrategy::TimeBased,
        }
    }
}

/// Thresholds for an explicit purge pass.
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Purge strategy to apply
    #[arg(long, value_enum, default_value = "count-based")]
    pub strategy: StrategyArg,

    /// Maximum tile count to keep
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: u64,

    /// Minimum number of tiles removed per pass
    #[arg(long, default_value_t = DEFAULT_MINIMAL_PURGE)]
    pub minimal_purge: u64,

    /// Expire tiles not accessed within this many seconds (time-based only)
    #[arg(long, default_value_t = 0)]
    pub expiry_secs: u64,
}

/// Show entry count, size on disk, and location of the tile database.
pub fn run_stats(db_path: &Path) -> Result<(), CliError> {
    let cache = PermanentCache::open_at(db_path, CacheConfig::default())?;
    let entries = cache.len()?;
    let size = std::fs::metadata(db_path)
        .map(|m| m.len())
        .map_err(|error| CliError::Inspect {
            path: db_path.display().to_string(),
            error,
        })?;

    println!("Tile database: {}", db_path.display());
    println!("  Entries: {}", entries);
    println!("  Size:    {}", format_size(size));
    Ok(())
}

/// Remove every tile from the database.
pub fn run_clear(db_path: &Path) -> Result<(), CliError> {
    let cache = PermanentCache::open_at(db_path, CacheConfig::default())?;
    let before = cache.len()?;
    cache.clear()?;

    println!("Cleared {} tiles from {}", before, db_path.display());
    Ok(())
}

/// Run one purge pass with the given thresholds.
pub fn run_purge(db_path: &Path, args: PurgeArgs) -> Result<(), CliError> {
    let config = CacheConfig::default()
        .with_strategy(args.strategy.into())
        .with_capacity(args.capacity)
        .with_minimal_purge(args.minimal_purge)
        .with_expiry_period(Duration::from_secs(args.expiry_secs));

    let cache = PermanentCache::open_at(db_path, config)?;
    let before = cache.len()?;
    let evicted = cache.purge()?;

    println!(
        "Purged {} of {} tiles, {} remain",
        evicted,
        before,
        cache.len()?
    );
    Ok(())
}

/// Print the database path without opening the store.
pub fn run_path(db_path: &Path) -> Result<(), CliError> {
    println!("{}", db_path.display());
    Ok(())
}

/// Format a byte count for human-readable output.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Resolve the database path from CLI flags.
pub fn resolve_database(
    database: Option<PathBuf>,
    use_cache_dir: bool,
) -> Result<PathBuf, CliError> {
    use tilevault::cache::{database_path, StorageLocation};

    match database {
        Some(path) => Ok(path),
        None => {
            let location = if use_cache_dir {
                StorageLocation::PurgeableCache
            } else {
                StorageLocation::AppData
            };
            database_path(location).map_err(CliError::Init)
        }
    }
}
