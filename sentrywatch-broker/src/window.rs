// sentrywatch-broker/src/window.rs
// ============================================================================
// Module: Per-Tenant Window Selection
// Description: Pure arithmetic deriving a tenant's fetch window for one tick.
// Purpose: Bound replay after a long outage while preserving the watermark.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Window selection is the one piece of scheduling arithmetic worth pulling
//! out of the orchestrator and testing on its own: given a tenant's last
//! watermark (if any) and the current instant, decide the half-open
//! `[since, until)` range the three upstream fetches should cover.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Window used when a tenant has never completed a successful run.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;
/// Hard ceiling on how far back `since` may fall behind `now`, regardless of
/// how stale `last_poll` is.
pub const MAX_LOOKBACK_MINUTES: i64 = 360;

// ============================================================================
// SECTION: Window Selection
// ============================================================================

/// Selects the `[since, until)` fetch window for a tenant.
///
/// `until` is always `now`. `since` is `now - DEFAULT_LOOKBACK_MINUTES` when
/// `last_poll` is absent, otherwise the later of `last_poll` and
/// `now - MAX_LOOKBACK_MINUTES` — the clamp that keeps a long-offline tenant
/// from replaying days of history in one tick.
#[must_use]
pub fn select_window(last_poll: Option<OffsetDateTime>, now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let floor = now - Duration::minutes(MAX_LOOKBACK_MINUTES);
    let since = match last_poll {
        None => now - Duration::minutes(DEFAULT_LOOKBACK_MINUTES),
        Some(last_poll) if last_poll > floor => last_poll,
        Some(_) => floor,
    };
    (since, now)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::select_window;

    #[test]
    fn absent_last_poll_uses_default_lookback() {
        let now = datetime!(2026-07-29 12:00:00 UTC);
        let (since, until) = select_window(None, now);
        assert_eq!(since, now - Duration::minutes(60));
        assert_eq!(until, now);
    }

    #[test]
    fn recent_last_poll_is_used_directly() {
        let now = datetime!(2026-07-29 12:00:00 UTC);
        let last_poll = now - Duration::minutes(10);
        let (since, _) = select_window(Some(last_poll), now);
        assert_eq!(since, last_poll);
    }

    #[test]
    fn stale_last_poll_is_clamped_to_max_lookback() {
        let now = datetime!(2026-07-29 12:00:00 UTC);
        let last_poll = now - Duration::days(10);
        let (since, _) = select_window(Some(last_poll), now);
        assert_eq!(since, now - Duration::minutes(360));
    }

    #[test]
    fn last_poll_never_set_more_than_max_lookback_before_now() {
        let now = datetime!(2026-07-29 12:00:00 UTC);
        for offset_minutes in [0_i64, 1, 59, 60, 61, 359, 360, 361, 100_000] {
            let last_poll = now - Duration::minutes(offset_minutes);
            let (since, _) = select_window(Some(last_poll), now);
            assert!(now - since <= Duration::minutes(360));
        }
    }
}
