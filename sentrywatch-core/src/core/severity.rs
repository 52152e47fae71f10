// sentrywatch-core/src/core/severity.rs
// ============================================================================
// Module: Sentrywatch Severity
// Description: Totally ordered alert/rule severity.
// Purpose: Support the Notifier's minimum-severity filter and Critical bypass.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Severity is totally ordered `Low < Medium < High < Critical`. Declaration
//! order drives the derived `Ord` impl; do not reorder these variants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Detection severity, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Severity {
    /// Informational or low-priority detection.
    Low,
    /// Standard-priority detection.
    Medium,
    /// Elevated-priority detection.
    High,
    /// Critical detection; bypasses the notification throttle.
    Critical,
}

impl Severity {
    /// Returns true when this severity bypasses the notification throttle.
    #[must_use]
    pub const fn bypasses_throttle(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(text)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Severity;

    #[test]
    fn total_order_is_low_medium_high_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn only_critical_bypasses_throttle() {
        assert!(Severity::Critical.bypasses_throttle());
        assert!(!Severity::High.bypasses_throttle());
        assert!(!Severity::Medium.bypasses_throttle());
        assert!(!Severity::Low.bypasses_throttle());
    }
}
