// sentrywatch-core/src/lib.rs
// ============================================================================
// Module: Sentrywatch Core Library
// Description: Public API surface for the Sentrywatch core.
// Purpose: Expose domain types, backend interfaces, and pure runtime logic.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Sentrywatch core provides the domain model, rule-evaluation algorithms,
//! and alert-state arithmetic behind a multi-tenant security-event polling
//! and alerting engine. It performs no I/O of its own and integrates through
//! the explicit async traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AlertSink;
pub use interfaces::AlertStateStore;
pub use interfaces::AuditLogClient;
pub use interfaces::ClientError;
pub use interfaces::ConfigStore;
pub use interfaces::ConfigStoreError;
pub use interfaces::NotifierTransport;
pub use interfaces::NotifierTransportError;
pub use interfaces::SecurityAlertClient;
pub use interfaces::SignInClient;
pub use interfaces::SinkError;
pub use interfaces::StoreError;
pub use runtime::RuleLoadError;
pub use runtime::TimestampExtractError;
pub use runtime::acting_user;
pub use runtime::derive_rule_id;
pub use runtime::evaluate;
pub use runtime::event_id;
pub use runtime::event_time;
pub use runtime::interpolate;
pub use runtime::is_duplicate;
pub use runtime::parse_rule_document;
pub use runtime::raw_summary;
pub use runtime::was_notified_recently;
