// sentrywatch-broker/src/lib.rs
// ============================================================================
// Module: Sentrywatch Broker
// Description: I/O-driving layer: orchestrator, scheduler, and notifier.
// Purpose: Wire sentrywatch-core's pure runtime to injected collaborators.
// Dependencies: sentrywatch-core, tokio, tracing
// ============================================================================

//! ## Overview
//! The broker crate owns nothing but orchestration: it knows how to drive a
//! tick across every tenant, on what cadence, and how to turn the resulting
//! alerts into a sink upload and a notification card. Every external
//! collaborator — upstream clients, the alert-state store, the config
//! store, the sink, the notifier transport — arrives as a trait object from
//! [`sentrywatch_core::interfaces`]; this crate performs no I/O of its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod notifier;
pub mod orchestrator;
pub mod scheduler;
pub mod window;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorConfig;
pub use scheduler::Scheduler;
pub use window::DEFAULT_LOOKBACK_MINUTES;
pub use window::MAX_LOOKBACK_MINUTES;
pub use window::select_window;
