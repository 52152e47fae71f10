// sentrywatch-core/src/core/alert.rs
// ============================================================================
// Module: Sentrywatch Alert
// Description: Emitted alert shape and alert-state table entries.
// Purpose: Canonical output of the evaluation pipeline and dedup/throttle state.
// Dependencies: crate::core::{identifiers, severity, source}, serde, time
// ============================================================================

//! ## Overview
//! An [`Alert`] is immutable once emitted. [`DedupEntry`] and
//! [`NotificationEntry`] are the two keyed, TTL-bounded table rows backing
//! the alert-state store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::TenantId;
use crate::core::severity::Severity;
use crate::core::source::SourceType;

// ============================================================================
// SECTION: Alert
// ============================================================================

/// An alert emitted when a rule matches and the dedup layer admits the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Source event time.
    pub time_generated: OffsetDateTime,
    /// Engine wall-clock time the alert was produced.
    pub time_processed: OffsetDateTime,
    /// Tenant the alert was generated for.
    pub tenant_id: TenantId,
    /// Tenant display name, denormalized for the Notifier.
    pub tenant_name: String,
    /// Acting user extracted; empty string when not applicable.
    pub user: String,
    /// Name of the rule that matched.
    pub rule_name: String,
    /// Severity of the matched rule.
    pub severity: Severity,
    /// Rule description, echoed for operator context.
    pub description: String,
    /// Upstream feed the source event came from.
    pub source: SourceType,
    /// Upstream event identifier.
    pub source_event_id: String,
    /// Bounded raw-event summary (at most 500 characters).
    pub raw_summary: String,
    /// Whether the Notifier should include this alert in its next card.
    pub should_notify: bool,
}

// ============================================================================
// SECTION: Alert-State Key
// ============================================================================

/// Key identifying a dedup/notification table row: `(tenant, digest)` where
/// `digest = truncate(hash(rule_name "|" lowercase(user)), 32)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlertStateKey {
    /// Tenant the entry belongs to.
    pub tenant_id: TenantId,
    /// Truncated cryptographic digest of `rule_name "|" lowercase(user)`.
    pub digest: String,
}

// ============================================================================
// SECTION: Dedup Entry
// ============================================================================

/// A dedup-table row. TTL: 5 minutes, measured against the event timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupEntry {
    /// Timestamp of the event that produced this entry.
    pub timestamp: OffsetDateTime,
    /// Name of the rule that produced this entry.
    pub rule_name: String,
    /// Acting user recorded with this entry.
    pub user: String,
}

// ============================================================================
// SECTION: Notification Entry
// ============================================================================

/// A notification-table row. TTL: 60 minutes, measured against wall-clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    /// Wall-clock time the last notification was recorded.
    pub last_notified: OffsetDateTime,
    /// Number of notifications recorded for this key so far.
    pub alert_count: u64,
    /// Name of the rule that produced this entry.
    pub rule_name: String,
    /// Acting user recorded with this entry.
    pub user: String,
}

// ============================================================================
// SECTION: TTLs
// ============================================================================

/// Dedup window.
pub const DEDUP_WINDOW_SECS: i64 = 5 * 60;
/// Notification throttle window.
pub const NOTIFICATION_WINDOW_SECS: i64 = 60 * 60;
/// Run-history retention.
pub const RUN_HISTORY_RETENTION_DAYS: i64 = 30;

// ============================================================================
// SECTION: Rule-Evaluation Key Derivation
// ============================================================================

/// Derives the alert-state key for a (tenant, rule, user) triple.
///
/// Hashing uses SHA-256 (a collision-resistant digest); the
/// hex digest is truncated to 32 characters. An empty `user` hashes as the
/// empty string, giving a rule with no acting user a single per-tenant slot.
#[must_use]
pub fn alert_state_key(tenant_id: &TenantId, rule_name: &str, user: &str) -> AlertStateKey {
    use sha2::Digest;
    use sha2::Sha256;

    let lowered = user.to_ascii_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(rule_name.as_bytes());
    hasher.update(b"|");
    hasher.update(lowered.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.truncate(32);

    AlertStateKey {
        tenant_id: tenant_id.clone(),
        digest: hex,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::alert_state_key;
    use crate::core::identifiers::TenantId;

    #[test]
    fn digest_is_stable_and_case_insensitive_on_user() {
        let tenant = TenantId::new("t1");
        let a = alert_state_key(&tenant, "Impossible Travel", "Alice@Example.com");
        let b = alert_state_key(&tenant, "Impossible Travel", "alice@example.com");
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 32);
    }

    #[test]
    fn empty_user_hashes_as_empty_string() {
        let tenant = TenantId::new("t1");
        let a = alert_state_key(&tenant, "Rule", "");
        let b = alert_state_key(&tenant, "Rule", "");
        assert_eq!(a, b);
    }

    #[test]
    fn different_rule_names_produce_different_digests() {
        let tenant = TenantId::new("t1");
        let a = alert_state_key(&tenant, "Rule A", "user");
        let b = alert_state_key(&tenant, "Rule B", "user");
        assert_ne!(a.digest, b.digest);
    }
}
