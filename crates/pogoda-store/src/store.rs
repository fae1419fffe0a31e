//! Main store implementation.

use std::path::Path;

use rusqlite::Connection;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{CityCount, HistoryEntry, TIMESTAMP_FORMAT};
use crate::schema;

/// Current wall-clock time in the local offset, or UTC when the offset
/// cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Render a timestamp in the stored `YYYY-MM-DD HH:MM:SS` form.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String> {
    at.format(TIMESTAMP_FORMAT)
        .map_err(|e| Error::InvalidTimestamp(e.to_string()))
}

/// SQLite-backed log of successful lookups.
///
/// Reads come in two flavours. `query_*` methods propagate storage errors;
/// [`Store::recent`] and [`Store::frequencies`] log them and return an
/// empty list so a page can always render. Writes always propagate.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening history database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Append a lookup of `city` made at `at`.
    pub fn append(&self, city: &str, at: OffsetDateTime) -> Result<HistoryEntry> {
        let timestamp = format_timestamp(at)?;

        self.conn.execute(
            "INSERT INTO search_history (city, timestamp) VALUES (?1, ?2)",
            rusqlite::params![city, timestamp],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!("Recorded lookup #{} for {:?} at {}", id, city, timestamp);

        Ok(HistoryEntry {
            id,
            city: city.to_string(),
            timestamp,
        })
    }

    /// Append a lookup of `city` made now.
    pub fn record(&self, city: &str) -> Result<HistoryEntry> {
        self.append(city, local_now())
    }

    /// Up to `limit` most recent lookups, newest first.
    pub fn query_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, city, timestamp FROM search_history
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    city: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Up to `limit` cities by lookup count, most frequent first.
    ///
    /// Ties go to the city that was first looked up earliest.
    pub fn query_frequencies(&self, limit: usize) -> Result<Vec<CityCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT city, COUNT(*) AS count FROM search_history
             GROUP BY city
             ORDER BY count DESC, MIN(id) ASC
             LIMIT ?1",
        )?;

        let counts = stmt
            .query_map([limit as i64], |row| {
                Ok(CityCount {
                    city: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Like [`Store::query_recent`], but an empty list on failure.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.query_recent(limit).unwrap_or_else(|e| {
            warn!("Failed to read recent lookups: {}", e);
            Vec::new()
        })
    }

    /// Like [`Store::query_frequencies`], but an empty list on failure.
    pub fn frequencies(&self, limit: usize) -> Vec<CityCount> {
        self.query_frequencies(limit).unwrap_or_else(|e| {
            warn!("Failed to read lookup frequencies: {}", e);
            Vec::new()
        })
    }

    /// Total number of stored lookups.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM search_history", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
