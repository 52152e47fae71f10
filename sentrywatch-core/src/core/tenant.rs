// sentrywatch-core/src/core/tenant.rs
// ============================================================================
// Module: Sentrywatch Tenant
// Description: Monitored tenant record and its terminal run status.
// Purpose: Track per-tenant watermark and last outcome across runs.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! A tenant's `last_poll` and `status` are mutated only by the orchestrator,
//! only on the terminal outcome of that tenant's run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Tenant Status
// ============================================================================

/// Terminal status of a tenant's most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TenantStatus {
    /// No run has completed yet.
    Unknown,
    /// The most recent run completed successfully.
    Success,
    /// The audit log is disabled for this tenant.
    AuditLogDisabled,
    /// The application has not been consented for this tenant.
    AppNotConsented,
    /// The upstream denied access (403-class response).
    PermissionDenied,
    /// The upstream reports the tenant does not exist.
    TenantNotFound,
    /// Any other upstream or network failure.
    Error,
}

impl TenantStatus {
    /// Returns true when this status represents a successful run.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

// ============================================================================
// SECTION: Tenant
// ============================================================================

/// A monitored tenant directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Human-readable display name.
    pub name: String,
    /// Upper bound of the last successfully processed window.
    pub last_poll: Option<OffsetDateTime>,
    /// Terminal status of the most recent run.
    pub status: TenantStatus,
    /// Optional diagnostic message accompanying `status`.
    pub status_message: Option<String>,
}

impl Tenant {
    /// Creates a freshly onboarded tenant with no prior run history.
    #[must_use]
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_poll: None,
            status: TenantStatus::Unknown,
            status_message: None,
        }
    }
}
