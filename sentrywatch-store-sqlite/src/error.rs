// sentrywatch-store-sqlite/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: SQLite-specific error taxonomy and conversions.
// Purpose: Translate backend failures into the trait-level error types.
// Dependencies: sentrywatch-core, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteStoreError`] distinguishes I/O, engine, and data-integrity
//! failures; both trait-level error enums ([`StoreError`] and
//! [`ConfigStoreError`]) collapse every variant into their single
//! `Backend`/generic-message case, since callers only branch on the
//! trait-level type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sentrywatch_core::ConfigStoreError;
use sentrywatch_core::StoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures opening or operating the `SQLite`-backed store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// A filesystem operation (directory creation, file open) failed.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// The `SQLite` engine reported an error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row could not be deserialized.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// The database's schema version is not one this crate understands.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<SqliteStoreError> for ConfigStoreError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Backend(error.to_string())
    }
}
