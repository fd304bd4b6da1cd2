//! Database path construction and storage location resolution.

use std::fmt;
use std::path::PathBuf;

use crate::cache::types::InitError;

/// Filename of the backing database.
pub const DATABASE_FILE: &str = "tiles.db";

/// Application subdirectory under the platform base directory.
const APP_DIR: &str = "tilevault";

/// Where the backing database lives on disk.
///
/// The two modes are mutually exclusive:
///
/// - [`StorageLocation::PurgeableCache`] places the database in the
///   platform's cache area, where the operating system may remove it to
///   reclaim space.
/// - [`StorageLocation::AppData`] places it in the durable application-data
///   area, where it survives until explicitly deleted and is included in
///   system backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    /// System-purgeable cache area (e.g. `~/.cache` on Linux)
    PurgeableCache,
    /// Durable application-data area (e.g. `~/.local/share` on Linux)
    AppData,
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::PurgeableCache => write!(f, "purgeable cache"),
            StorageLocation::AppData => write!(f, "application data"),
        }
    }
}

/// Compute the database path for a storage location without opening it.
///
/// Collaborators such as backup or cleanup tooling may need the path of the
/// backing file without holding an open handle to it.
///
/// # Errors
///
/// Returns [`InitError::NoBaseDirectory`] if the platform provides no base
/// directory for the chosen location.
///
/// # Example
///
/// ```no_run
/// use tilevault::cache::{database_path, StorageLocation};
///
/// let path = database_path(StorageLocation::AppData)?;
/// println!("tile database at {}", path.display());
/// # Ok::<(), tilevault::cache::InitError>(())
/// ```
pub fn database_path(location: StorageLocation) -> Result<PathBuf, InitError> {
    let base = match location {
        StorageLocation::PurgeableCache => dirs::cache_dir(),
        StorageLocation::AppData => dirs::data_dir(),
    };

    base.map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
        .ok_or(InitError::NoBaseDirectory { location })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_app_data() {
        let path = database_path(StorageLocation::AppData).unwrap();

        assert!(path.ends_with("tilevault/tiles.db"));
    }

    #[test]
    fn test_database_path_purgeable_cache() {
        let path = database_path(StorageLocation::PurgeableCache).unwrap();

        assert!(path.ends_with("tilevault/tiles.db"));
    }

    #[test]
    fn test_locations_resolve_to_distinct_paths() {
        let cache = database_path(StorageLocation::PurgeableCache).unwrap();
        let data = database_path(StorageLocation::AppData).unwrap();

        assert_ne!(cache, data);
    }

    #[test]
    fn test_storage_location_display() {
        assert_eq!(
            StorageLocation::PurgeableCache.to_string(),
            "purgeable cache"
        );
        assert_eq!(StorageLocation::AppData.to_string(), "application data");
    }
}
