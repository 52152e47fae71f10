// sentrywatch-broker/src/scheduler.rs
// ============================================================================
// Module: Scheduler
// Description: Fixed-cadence, non-overlapping driver for the Orchestrator.
// Purpose: Run ticks on a cadence without ever overlapping two runs.
// Dependencies: sentrywatch-core, tokio, tracing
// ============================================================================

//! ## Overview
//! The scheduler's only job is timing: it calls [`Orchestrator::run_once`]
//! every `interval`, skipping a tick entirely (rather than queuing it) if
//! the previous run is still in flight, and flags the skipped tick as
//! overdue so an operator can see cadence drift in the logs. A run's own
//! duration is never allowed to compress the next run's start below
//! `interval` early — non-overlap always wins over strict cadence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration as StdDuration;

use time::OffsetDateTime;

use crate::orchestrator::Orchestrator;

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Drives an [`Orchestrator`] on a fixed cadence with a non-overlap guarantee.
pub struct Scheduler {
    orchestrator: Orchestrator,
    interval: StdDuration,
}

impl Scheduler {
    /// Builds a scheduler that runs `orchestrator` every `interval`.
    #[must_use]
    pub const fn new(orchestrator: Orchestrator, interval: StdDuration) -> Self {
        Self { orchestrator, interval }
    }

    /// Runs forever, calling [`Orchestrator::run_once`] every `interval` and
    /// never overlapping two runs. A run that takes longer than `interval`
    /// causes the following tick to be skipped and logged as overdue rather
    /// than queued; the scheduler resumes on the next clean boundary.
    pub async fn serve(&self) -> ! {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            let tick_started_at = ticker.tick().await;
            let overdue = tick_started_at.elapsed() >= self.interval;
            if overdue {
                tracing::warn!(interval_secs = self.interval.as_secs(), "scheduler tick was overdue, previous run likely exceeded the interval");
            }

            let now = OffsetDateTime::now_utc();
            tracing::info!(%now, "starting scheduled run");
            let summary = self.orchestrator.run_once(now).await;
            tracing::info!(
                status = ?summary.status,
                duration_ms = summary.duration_ms,
                clients_checked = summary.clients_checked,
                events_processed = summary.events_processed,
                alerts_generated = summary.alerts_generated,
                "run complete"
            );
        }
    }

    /// Runs exactly one tick and returns its summary, for `run-once`
    /// invocations (cron, Kubernetes CronJob) that do not want an
    /// in-process loop.
    pub async fn run_once(&self) -> sentrywatch_core::RunSummary {
        self.orchestrator.run_once(OffsetDateTime::now_utc()).await
    }
}
