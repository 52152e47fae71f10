// sentrywatch-core/src/runtime/mod.rs
// ============================================================================
// Module: Sentrywatch Runtime
// Description: Pure rule-evaluation, field-extraction, and state-window logic.
// Purpose: Host every algorithm the orchestrator calls into without I/O.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runtime is the engine's decision layer: dotted-path field access,
//! operator application, template interpolation, rule evaluation, per-source
//! field extraction, rule-document parsing, and alert-state window
//! arithmetic. None of it touches the filesystem, the network, or a clock
//! other than the instants callers pass in.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod accessor;
pub mod alert_state;
pub mod evaluator;
pub mod extract;
pub mod interpolator;
pub mod operator;
pub mod rule_loader;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use alert_state::is_duplicate;
pub use alert_state::was_notified_recently;
pub use evaluator::evaluate;
pub use extract::TimestampExtractError;
pub use extract::acting_user;
pub use extract::event_id;
pub use extract::event_time;
pub use extract::raw_summary;
pub use interpolator::interpolate;
pub use rule_loader::RuleLoadError;
pub use rule_loader::derive_rule_id;
pub use rule_loader::parse_rule_document;
