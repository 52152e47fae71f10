// sentrywatch-core/src/runtime/alert_state.rs
// ============================================================================
// Module: Sentrywatch Alert-State Window Logic
// Description: Pure TTL/boundary arithmetic backing the two-layer alert state.
// Purpose: Decide duplicate-suppression and notification-throttle outcomes.
// Dependencies: crate::core::alert, time
// ============================================================================

//! ## Overview
//! The alert-state store persists rows; this module decides, given a
//! possibly-stale row and the current instant, whether an incoming alert is
//! a duplicate or whether its notification should be throttled. Both
//! windows are strict: an elapsed duration exactly equal to the window
//! boundary does not count as within it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;

use crate::core::alert::DedupEntry;
use crate::core::alert::NotificationEntry;
use crate::core::alert::DEDUP_WINDOW_SECS;
use crate::core::alert::NOTIFICATION_WINDOW_SECS;

// ============================================================================
// SECTION: Dedup Window
// ============================================================================

/// Returns true iff `candidate_event_time` falls within the dedup window of
/// `entry`'s stored event timestamp.
///
/// The comparison uses the absolute difference between the two event
/// timestamps, so a late-arriving earlier event is deduplicated the same as
/// a later one. Exactly 5 minutes apart is not a duplicate.
#[must_use]
pub fn is_duplicate(entry: &DedupEntry, candidate_event_time: OffsetDateTime) -> bool {
    within_strict_window(entry.timestamp, candidate_event_time, DEDUP_WINDOW_SECS)
}

// ============================================================================
// SECTION: Notification Throttle
// ============================================================================

/// Returns true iff `now` falls within the notification-throttle window
/// measured from `entry.last_notified`.
///
/// Exactly 60 minutes since the last notification is not throttled.
#[must_use]
pub fn was_notified_recently(entry: &NotificationEntry, now: OffsetDateTime) -> bool {
    within_strict_window(entry.last_notified, now, NOTIFICATION_WINDOW_SECS)
}

// ============================================================================
// SECTION: Shared Window Arithmetic
// ============================================================================

/// Returns true iff the absolute difference between `reference` and `other`
/// is strictly less than `window_secs`.
fn within_strict_window(reference: OffsetDateTime, other: OffsetDateTime, window_secs: i64) -> bool {
    let elapsed = if other >= reference { other - reference } else { reference - other };
    elapsed < Duration::seconds(window_secs)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::is_duplicate;
    use super::was_notified_recently;
    use crate::core::alert::DedupEntry;
    use crate::core::alert::NotificationEntry;

    fn dedup_entry_at(timestamp: time::OffsetDateTime) -> DedupEntry {
        DedupEntry { timestamp, rule_name: "rule".to_string(), user: "user".to_string() }
    }

    fn notification_entry_at(last_notified: time::OffsetDateTime) -> NotificationEntry {
        NotificationEntry { last_notified, alert_count: 1, rule_name: "rule".to_string(), user: "user".to_string() }
    }

    #[test]
    fn dedup_window_admits_event_one_second_inside() {
        let anchor = datetime!(2026-07-29 12:00:00 UTC);
        let entry = dedup_entry_at(anchor);
        let candidate = anchor + Duration::minutes(4) + Duration::seconds(59);
        assert!(is_duplicate(&entry, candidate));
    }

    #[test]
    fn dedup_window_boundary_at_exactly_five_minutes_is_not_a_duplicate() {
        let anchor = datetime!(2026-07-29 12:00:00 UTC);
        let entry = dedup_entry_at(anchor);
        let candidate = anchor + Duration::minutes(5);
        assert!(!is_duplicate(&entry, candidate));
    }

    #[test]
    fn dedup_window_is_symmetric_for_out_of_order_timestamps() {
        let anchor = datetime!(2026-07-29 12:00:00 UTC);
        let entry = dedup_entry_at(anchor);
        let candidate = anchor - Duration::minutes(4);
        assert!(is_duplicate(&entry, candidate));
    }

    #[test]
    fn notification_window_admits_throttle_one_second_inside() {
        let anchor = datetime!(2026-07-29 12:00:00 UTC);
        let entry = notification_entry_at(anchor);
        let now = anchor + Duration::minutes(59) + Duration::seconds(59);
        assert!(was_notified_recently(&entry, now));
    }

    #[test]
    fn notification_window_boundary_at_exactly_sixty_minutes_is_not_throttled() {
        let anchor = datetime!(2026-07-29 12:00:00 UTC);
        let entry = notification_entry_at(anchor);
        let now = anchor + Duration::minutes(60);
        assert!(!was_notified_recently(&entry, now));
    }
}
