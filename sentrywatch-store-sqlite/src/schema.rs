// sentrywatch-store-sqlite/src/schema.rs
// ============================================================================
// Module: Schema Management
// Description: Connection setup, PRAGMA application, and migration gating.
// Purpose: Open a SQLite connection and bring it to SCHEMA_VERSION.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Schema initialization is version-gated: a fresh database gets the full
//! `CREATE TABLE` batch, an up-to-date database is a no-op, and any other
//! observed version is rejected rather than silently migrated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use rusqlite::Connection;
use rusqlite::OpenFlags;

use crate::SqliteStoreConfig;
use crate::SqliteStoreError;

/// Schema version this crate writes and expects to read.
pub const SCHEMA_VERSION: i64 = 1;

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Opens the database at `config.path`, creating it if absent.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the connection cannot be opened or
/// a PRAGMA cannot be applied.
pub fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    ensure_parent_dir(&config.path)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Creates the parent directory of `path`, if any, so `SQLite` can create
/// the database file itself.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    Ok(())
}

/// Applies busy-timeout, journal-mode, and foreign-key pragmas.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "foreign_keys", "on".to_string())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "journal_mode", config.journal_mode.pragma_value().to_string())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "synchronous", config.sync_mode.pragma_value().to_string())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Migration
// ============================================================================

/// Brings `connection`'s schema to [`SCHEMA_VERSION`], creating tables on a
/// fresh database.
///
/// # Errors
///
/// Returns [`SqliteStoreError::VersionMismatch`] when the database reports
/// a schema version this crate does not know how to migrate from, or
/// [`SqliteStoreError::Db`] on any other SQL failure.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let current: i64 = connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    match current {
        0 => create_schema(connection),
        version if version == SCHEMA_VERSION => Ok(()),
        other => Err(SqliteStoreError::VersionMismatch(format!(
            "database reports schema version {other}, this crate expects {SCHEMA_VERSION}"
        ))),
    }
}

/// Creates every table this crate owns and stamps `user_version`.
fn create_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS tenants (
            tenant_id TEXT PRIMARY KEY,
            tenant_json TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS dedup_entries (
            tenant_id TEXT NOT NULL,
            digest TEXT NOT NULL,
            entry_json TEXT NOT NULL,
            event_time_unix_ms INTEGER NOT NULL,
            PRIMARY KEY (tenant_id, digest)
         );
         CREATE TABLE IF NOT EXISTS notification_entries (
            tenant_id TEXT NOT NULL,
            digest TEXT NOT NULL,
            entry_json TEXT NOT NULL,
            last_notified_unix_ms INTEGER NOT NULL,
            PRIMARY KEY (tenant_id, digest)
         );
         CREATE TABLE IF NOT EXISTS alerts_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            config_json TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS run_summaries (
            row_key TEXT PRIMARY KEY,
            start_time_unix_ms INTEGER NOT NULL,
            summary_json TEXT NOT NULL
         );",
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}
