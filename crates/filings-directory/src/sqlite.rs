//! SQLite-backed directory implementation.

use chrono::Utc;
use crate::code::normalize_corp_code;
use filings_core::{EntityDirectory, FilingError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// Persistent corp-code directory stored in SQLite.
///
/// Rows carry a `cached_at` timestamp so stale names can be evicted with
/// [`invalidate_stale`](Self::invalidate_stale) and refreshed from an upstream listing.
#[derive(Debug)]
pub struct SqliteDirectory {
    conn: Mutex<Connection>,
}

impl SqliteDirectory {
    /// Open (or create) a directory database at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| FilingError::Directory(e.to_string()))?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Create an in-memory directory database.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| FilingError::Directory(e.to_string()))?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS corp_map (
                corp_code TEXT PRIMARY KEY NOT NULL,
                corp_name TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| FilingError::Directory(e.to_string()))?;

        debug!("SQLite directory schema initialized");
        Ok(())
    }

    /// Insert or replace `(corp_code, corp_name)` pairs, stamping them with the current time.
    ///
    /// Codes are stored in [`normalize_corp_code`] form.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    #[instrument(skip(self, entries))]
    pub fn upsert_entries<I, K, V>(&self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let cached_at = Utc::now().to_rfc3339();

        let mut count = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO corp_map (corp_code, corp_name, cached_at)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| FilingError::Directory(e.to_string()))?;
            for (code, name) in entries {
                let code = normalize_corp_code(code.as_ref());
                stmt.execute(params![code, name.as_ref(), cached_at])
                    .map_err(|e| FilingError::Directory(e.to_string()))?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        debug!("Upserted {} corp entries", count);
        Ok(count)
    }

    /// Returns the number of stored entries.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM corp_map", [], |row| row.get(0))
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Remove entries cached longer ago than `ttl`.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    #[instrument(skip(self))]
    pub fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| FilingError::InvalidParameter(e.to_string()))?;
        let cutoff = (Utc::now() - ttl).to_rfc3339();
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let removed = conn
            .execute("DELETE FROM corp_map WHERE cached_at < ?1", params![cutoff])
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        debug!("Invalidated {} stale corp entries", removed);
        Ok(removed)
    }

    /// Remove all entries.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        conn.execute("DELETE FROM corp_map", [])
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        debug!("Cleared corp directory");
        Ok(())
    }
}

impl EntityDirectory for SqliteDirectory {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self))]
    fn lookup(&self, entity_code: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        let name = conn
            .query_row(
                "SELECT corp_name FROM corp_map WHERE corp_code = ?1",
                params![normalize_corp_code(entity_code)],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| FilingError::Directory(e.to_string()))?;
        debug!(hit = name.is_some(), "SQLite directory lookup");
        Ok(name)
    }

    fn reload(&self) -> Result<()> {
        // Every lookup reads the database, so there is no snapshot to refresh.
        Ok(())
    }
}
