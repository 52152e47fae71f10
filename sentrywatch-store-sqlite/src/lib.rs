// sentrywatch-store-sqlite/src/lib.rs
// ============================================================================
// Module: Sentrywatch SQLite Store Library
// Description: Public API surface for the SQLite-backed store crate.
// Purpose: Expose SqliteStore, its configuration, and its error type.
// Dependencies: crate::{config, error, memory, schema, store}
// ============================================================================

//! ## Overview
//! This crate implements both [`sentrywatch_core::AlertStateStore`] and
//! [`sentrywatch_core::ConfigStore`] against a single `SQLite` database, and
//! ships an in-memory variant of the same two traits for tests and local
//! development that don't want a database file on disk.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod config;
mod error;
mod memory;
mod schema;
mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::SqliteStoreConfig;
pub use config::SqliteStoreMode;
pub use config::SqliteSyncMode;
pub use error::SqliteStoreError;
pub use memory::InMemoryStore;
pub use schema::SCHEMA_VERSION;
pub use store::SqliteStore;
