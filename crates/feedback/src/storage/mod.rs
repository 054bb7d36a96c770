//! Storage layer for the feedback service.
//!
//! This module provides `SQLite`-based persistent storage for feedback
//! records. A [`Storage`] handle is cheap to clone; clones share a single
//! connection guarded by a mutex, which together with `SQLite`'s own
//! transactions is the only concurrency control in the service.

pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{format_timestamp, Feedback, NewFeedback};

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Path reported for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

const SELECT_COLUMNS: &str = "SELECT id, name, email, message, created_at FROM feedback";

/// Storage engine for feedback records.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Shared database connection.
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then initializes the schema. Safe to call on every startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened, or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Commits reach disk before insert returns
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        schema::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self::from_connection(path, conn))
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self::from_connection(PathBuf::from(MEMORY_PATH), conn))
    }

    fn from_connection(path: PathBuf, conn: Connection) -> Self {
        Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a validated submission, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, new: &NewFeedback) -> Result<Feedback> {
        self.insert_at(new, Utc::now())
    }

    /// Insert a validated submission with an explicit creation time.
    ///
    /// The row is committed before this returns. The timestamp is truncated
    /// to microseconds, the precision it is stored at.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_at(&self, new: &NewFeedback, created_at: DateTime<Utc>) -> Result<Feedback> {
        // Match the precision that is persisted
        let created_at = created_at.trunc_subsecs(6);
        let conn = self.conn.lock();
        conn.execute(
            r"
            INSERT INTO feedback (name, email, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                new.name(),
                new.email(),
                new.message(),
                format_timestamp(&created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        debug!("Inserted feedback with id {}", id);
        Ok(Feedback {
            id,
            name: new.name().to_string(),
            email: new.email().map(str::to_string),
            message: new.message().to_string(),
            created_at,
        })
    }

    /// Get a feedback record by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Feedback>> {
        let conn = self.conn.lock();
        let result = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                [id],
                Self::row_to_feedback,
            )
            .optional()?;
        Ok(result)
    }

    /// Get the most recent records, newest first.
    ///
    /// `limit` is passed to `SQLite` unchanged: a negative value returns
    /// every row and zero returns none.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent(&self, limit: i64) -> Result<Vec<Feedback>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;

        let records = stmt
            .query_map([limit], Self::row_to_feedback)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count total records in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count)
    }

    // ---------------- Async wrappers (spawn_blocking) ----------------

    /// Run [`Storage::insert`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the blocking task panics.
    pub async fn insert_async(&self, new: NewFeedback) -> Result<Feedback> {
        let storage = self.clone();
        tokio::task::spawn_blocking(move || storage.insert(&new))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }

    /// Run [`Storage::recent`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the blocking task panics.
    pub async fn recent_async(&self, limit: i64) -> Result<Vec<Feedback>> {
        let storage = self.clone();
        tokio::task::spawn_blocking(move || storage.recent(limit))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }

    /// Run [`Storage::count`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the blocking task panics.
    pub async fn count_async(&self) -> Result<i64> {
        let storage = self.clone();
        tokio::task::spawn_blocking(move || storage.count())
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }

    /// Convert a database row to a Feedback struct.
    fn row_to_feedback(row: &rusqlite::Row) -> rusqlite::Result<Feedback> {
        let created_at_str: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(Feedback {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            message: row.get(3)?,
            created_at,
        })
    }
}
