//! SQLite storage backend for tile data.
//!
//! Persists tiles as rows of `(source, zoom, col, row, data, last_access)`
//! in a single database file. Writes are atomic per key; deletes are batched
//! in one transaction. Eviction ordering queries sort by `last_access` with
//! insertion order (rowid) as the tiebreaker, so purge selection is
//! deterministic even when timestamps collide.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::cache::purge::PurgeQueries;
use crate::cache::types::{InitError, StorageError, TileKey};

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tiles (
    source      TEXT    NOT NULL,
    zoom        INTEGER NOT NULL,
    col         INTEGER NOT NULL,
    row         INTEGER NOT NULL,
    data        BLOB    NOT NULL,
    last_access INTEGER NOT NULL,
    PRIMARY KEY (source, zoom, col, row)
);
CREATE INDEX IF NOT EXISTS idx_tiles_last_access ON tiles (last_access);
";

/// Durable tile store backed by a single SQLite database file.
///
/// The store persists opaque tile bytes addressed by [`TileKey`] together
/// with a last-access timestamp in unix-epoch milliseconds. It performs no
/// eviction of its own; purge policies consume its read-only query surface
/// ([`PurgeQueries`]) and the cache manager issues the deletes.
pub struct TileStore {
    conn: Connection,
    path: PathBuf,
}

impl TileStore {
    /// Open or create the store at the given path.
    ///
    /// The parent directory is created if missing. An existing file that is
    /// not a usable database fails with [`InitError::Schema`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    InitError::CreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let conn = Connection::open(&path).map_err(|source| InitError::Open {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(InitError::Schema)?;

        // WAL keeps readers unblocked during writes; the pragma returns the
        // resulting mode as a row, so it cannot go through execute().
        let _mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(InitError::Schema)?;

        conn.execute_batch(SCHEMA).map_err(InitError::Schema)?;

        tracing::debug!(path = %path.display(), "tile store opened");

        Ok(Self { conn, path })
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get stored bytes for a key, if present.
    ///
    /// Does not refresh `last_access`; timestamp updates on read are the
    /// cache manager's responsibility.
    pub fn get(&self, key: &TileKey) -> Result<Option<Vec<u8>>, StorageError> {
        let result = self.conn.query_row(
            "SELECT data FROM tiles
             WHERE source = ?1 AND zoom = ?2 AND col = ?3 AND row = ?4",
            params![key.source, key.zoom, key.col, key.row],
            |row| row.get::<_, Vec<u8>>(0),
        );

        match result {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite an entry, setting `last_access = now`.
    ///
    /// The upsert is a single statement, so a failed write leaves no partial
    /// entry and a reader never observes partially-written bytes. Overwrite
    /// preserves the row's insertion order (rowid), keeping eviction
    /// tiebreaks stable across updates.
    pub fn put(&self, key: &TileKey, data: &[u8], now: i64) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO tiles (source, zoom, col, row, data, last_access)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (source, zoom, col, row)
             DO UPDATE SET data = excluded.data, last_access = excluded.last_access",
            params![key.source, key.zoom, key.col, key.row, data, now],
        )?;
        Ok(())
    }

    /// Refresh `last_access` without altering the stored bytes.
    ///
    /// A missing key is not an error.
    pub fn touch(&self, key: &TileKey, now: i64) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE tiles SET last_access = ?5
             WHERE source = ?1 AND zoom = ?2 AND col = ?3 AND row = ?4",
            params![key.source, key.zoom, key.col, key.row, now],
        )?;
        Ok(())
    }

    /// Delete the listed keys in one transaction.
    ///
    /// Missing keys are not an error. Returns the number of rows actually
    /// removed.
    pub fn delete(&mut self, keys: &[TileKey]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut removed = 0usize;
        {
            let mut stmt = tx.prepare(
                "DELETE FROM tiles
                 WHERE source = ?1 AND zoom = ?2 AND col = ?3 AND row = ?4",
            )?;
            for key in keys {
                removed += stmt.execute(params![key.source, key.zoom, key.col, key.row])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Remove every entry.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM tiles", [])?;
        Ok(())
    }

    /// Last-access timestamp for a key, if present.
    pub fn last_access(&self, key: &TileKey) -> Result<Option<i64>, StorageError> {
        let result = self.conn.query_row(
            "SELECT last_access FROM tiles
             WHERE source = ?1 AND zoom = ?2 AND col = ?3 AND row = ?4",
            params![key.source, key.zoom, key.col, key.row],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(ts) => Ok(Some(ts)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl PurgeQueries for TileStore {
    fn count_entries(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn oldest_entries(&self, limit: u64) -> Result<Vec<TileKey>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT source, zoom, col, row FROM tiles
             ORDER BY last_access ASC, rowid ASC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TileKey {
                source: row.get(0)?,
                zoom: row.get(1)?,
                col: row.get(2)?,
                row: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn entries_older_than(&self, threshold: i64) -> Result<Vec<TileKey>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT source, zoom, col, row FROM tiles
             WHERE last_access < ?1
             ORDER BY last_access ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![threshold], |row| {
            Ok(TileKey {
                source: row.get(0)?,
                zoom: row.get(1)?,
                col: row.get(2)?,
                row: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
