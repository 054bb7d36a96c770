//! `SQLite` schema definitions for the feedback service.
//!
//! This module contains the SQL statements for creating the database schema
//! and the idempotent initialization step that runs them.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// SQL statement to create the feedback table.
///
/// Column lengths mirror the documented limits but are not enforced by `SQLite`.
pub const CREATE_FEEDBACK_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(120) NOT NULL,
    email VARCHAR(200),
    message TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for recency queries.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_feedback_created_at ON feedback(created_at DESC)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_FEEDBACK_TABLE, CREATE_CREATED_AT_INDEX];

/// Create the schema if it does not exist.
///
/// Every statement is guarded with `IF NOT EXISTS`, so running this against
/// an already-initialized database is a no-op.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    debug!("Schema initialized");
    Ok(())
}
