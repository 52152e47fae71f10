// sentrywatch-store-sqlite/src/config.rs
// ============================================================================
// Module: Store Configuration
// Description: SQLite connection and pragma configuration for the store.
// Purpose: Carry the path and durability knobs a deployment may need to tune.
// Dependencies: std::path
// ============================================================================

//! ## Overview
//! [`SqliteStoreConfig`] is intentionally small: a path plus the handful of
//! `SQLite` pragmas that matter for a single-writer, append-heavy workload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

/// Default busy timeout applied to every connection.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Journal / Sync Mode
// ============================================================================

/// `SQLite` journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended for concurrent readers).
    #[default]
    Wal,
    /// Legacy delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `PRAGMA journal_mode` value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` synchronous mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteSyncMode {
    /// Full synchronous durability (safest, slowest).
    #[default]
    Full,
    /// Normal synchronous durability.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `PRAGMA synchronous` value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

// ============================================================================
// SECTION: Store Configuration
// ============================================================================

/// Configuration for opening the `SQLite`-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the database file. `:memory:` opens a private in-memory
    /// database, useful in tests.
    pub path: PathBuf,
    /// Busy timeout applied to the connection, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Journal mode pragma.
    pub journal_mode: SqliteStoreMode,
    /// Synchronous mode pragma.
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config pointed at `path` with default durability settings.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}
