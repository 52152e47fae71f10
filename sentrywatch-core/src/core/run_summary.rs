// sentrywatch-core/src/core/run_summary.rs
// ============================================================================
// Module: Sentrywatch Run Summary
// Description: Per-run outcome record persisted for operator retrieval.
// Purpose: Record counts and terminal state for one scheduler tick.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A [`RunSummary`] is produced once per run and stored newest-first.
//! `status` degrades to `Partial` rather than `Error` when a downstream
//! surface fails but tenant processing itself completed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Run Status
// ============================================================================

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    /// Every tenant, the sink upload, and the notifier post all succeeded.
    Success,
    /// At least one per-tenant error, sink failure, or notifier failure
    /// occurred, but the run otherwise completed.
    Partial,
    /// The run could not complete (fatal configuration or programmer error).
    Error,
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Summary row describing one scheduler tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Wall-clock time the run started.
    pub start_time: OffsetDateTime,
    /// Wall-clock time the run ended.
    pub end_time: OffsetDateTime,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
    /// Number of tenants whose three upstream clients were invoked.
    pub clients_checked: u64,
    /// Total events evaluated across all tenants and sources.
    pub events_processed: u64,
    /// Total alerts emitted (after dedup, before throttle filtering).
    pub alerts_generated: u64,
    /// Terminal run status.
    pub status: RunStatus,
    /// Truncated diagnostic message when `status` is not `Success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
