// SQLite backend. One connection per call, one implicit row per movie, and
// the UNIQUE index on `title` as the only duplicate check.

use super::{normalize_poster, normalize_title, Catalog, MovieInfo, MovieStore, StoreError, StoreResult};
use log::{debug, info, warn};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT UNIQUE NOT NULL,
        year INTEGER NOT NULL,
        rating REAL NOT NULL,
        poster TEXT
    )";

/// Catalog stored in a single `movies` table of an SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open an existing database for writing. The file is never created
    /// here; that is `initialize`'s job.
    fn open_for_write(&self) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::write_failed(&self.path, e))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StoreError::write_failed(&self.path, e))?;
        Ok(conn)
    }

    /// Run one write statement inside an immediate transaction and return
    /// the number of affected rows. The transaction rolls back on drop if
    /// the statement or the commit fails.
    fn write<F>(&self, statement: F) -> StoreResult<Option<usize>>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<usize>,
    {
        let mut conn = self.open_for_write()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| StoreError::write_failed(&self.path, e))?;
        let changed = match statement(&tx) {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => return Ok(None),
            Err(err) => {
                warn!("catalog write rejected at {}: {}", self.path.display(), err);
                return Err(StoreError::write_failed(&self.path, err));
            }
        };
        tx.commit()
            .map_err(|e| StoreError::write_failed(&self.path, e))?;
        Ok(Some(changed))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

impl MovieStore for SqliteStore {
    fn initialize(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(&self.path, e))?;
        }
        let conn = Connection::open(&self.path).map_err(|e| StoreError::unavailable(&self.path, e))?;
        // Fails with "file is not a database" on a corrupt file.
        conn.execute_batch(CREATE_TABLE)
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        info!("catalog ready at {}", self.path.display());
        Ok(())
    }

    fn list(&self) -> StoreResult<Catalog> {
        if !self.path.exists() {
            return Ok(Catalog::new());
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::unavailable(&self.path, e))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StoreError::unavailable(&self.path, e))?;

        let has_table: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'movies'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        if !has_table {
            return Ok(Catalog::new());
        }

        let mut stmt = conn
            .prepare("SELECT title, year, rating, poster FROM movies")
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    MovieInfo {
                        year: row.get(1)?,
                        rating: row.get(2)?,
                        poster: row.get(3)?,
                    },
                ))
            })
            .map_err(|e| StoreError::unavailable(&self.path, e))?;
        rows.collect::<rusqlite::Result<Catalog>>()
            .map_err(|e| StoreError::unavailable(&self.path, e))
    }

    fn add(&self, title: &str, year: i32, rating: f64, poster: Option<&str>) -> StoreResult<bool> {
        let title = normalize_title(title);
        let poster = normalize_poster(poster);
        let outcome = self.write(|tx| {
            tx.execute(
                "INSERT INTO movies (title, year, rating, poster) VALUES (?1, ?2, ?3, ?4)",
                params![title, year, rating, poster],
            )
        })?;
        match outcome {
            Some(_) => {
                debug!("added movie '{}'", title);
                Ok(true)
            }
            None => {
                debug!("movie '{}' already in catalog", title);
                Ok(false)
            }
        }
    }

    fn update(&self, title: &str, rating: f64) -> StoreResult<bool> {
        let title = normalize_title(title);
        let changed = self.write(|tx| {
            tx.execute(
                "UPDATE movies SET rating = ?1 WHERE title = ?2",
                params![rating, title],
            )
        })?;
        let updated = changed.unwrap_or(0) > 0;
        debug!("update '{}': matched={}", title, updated);
        Ok(updated)
    }

    fn delete(&self, title: &str) -> StoreResult<bool> {
        let title = normalize_title(title);
        let changed = self.write(|tx| tx.execute("DELETE FROM movies WHERE title = ?1", params![title]))?;
        let deleted = changed.unwrap_or(0) > 0;
        debug!("delete '{}': matched={}", title, deleted);
        Ok(deleted)
    }
}
