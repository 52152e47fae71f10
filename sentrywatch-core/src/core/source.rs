// sentrywatch-core/src/core/source.rs
// ============================================================================
// Module: Sentrywatch Source Types
// Description: Upstream feed selector shared by rules and events.
// Purpose: Select which upstream feed a rule applies to and an event came from.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! `SourceType` selects one of the three upstream feeds. Rules are filtered
//! by source before any condition is evaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Source Type
// ============================================================================

/// Upstream feed a rule applies to, or an event was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SourceType {
    /// Sign-in log feed.
    SignIn,
    /// Security-alert feed.
    SecurityAlert,
    /// Audit-activity log feed.
    AuditLog,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SignIn => "SignIn",
            Self::SecurityAlert => "SecurityAlert",
            Self::AuditLog => "AuditLog",
        };
        f.write_str(text)
    }
}
