// sentrywatch-broker/src/orchestrator.rs
// ============================================================================
// Module: Per-Run Orchestrator
// Description: Drives one scheduler tick across every monitored tenant.
// Purpose: Fan out upstream fetches, evaluate rules, apply alert-state,
// ingest to the sink, notify, sweep, and record a run summary.
// Dependencies: sentrywatch-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`Orchestrator::run_once`] is the engine's single unit of work: it loads
//! the rule catalog and tenant list fresh, processes tenants **sequentially**
//! (so a failure never contaminates attribution), fans out the three
//! upstream fetches **concurrently** within each tenant, runs every fetched
//! event through the evaluator and the two-layer alert-state machine, then
//! ingests the collected batch, sends one notification card, sweeps expired
//! state, and persists a [`RunSummary`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::OffsetDateTime;
use tokio::time::error::Elapsed;
use tracing::Instrument;

use sentrywatch_core::Alert;
use sentrywatch_core::AlertDeliveryConfig;
use sentrywatch_core::AlertSink;
use sentrywatch_core::AlertStateStore;
use sentrywatch_core::AuditLogClient;
use sentrywatch_core::ClientError;
use sentrywatch_core::ConfigStore;
use sentrywatch_core::DedupEntry;
use sentrywatch_core::EventTree;
use sentrywatch_core::NotificationEntry;
use sentrywatch_core::NotifierTransport;
use sentrywatch_core::Rule;
use sentrywatch_core::RunStatus;
use sentrywatch_core::RunSummary;
use sentrywatch_core::SecurityAlertClient;
use sentrywatch_core::Severity;
use sentrywatch_core::SignInClient;
use sentrywatch_core::SourceType;
use sentrywatch_core::Tenant;
use sentrywatch_core::TenantStatus;
use sentrywatch_core::acting_user;
use sentrywatch_core::alert_state_key;
use sentrywatch_core::evaluate;
use sentrywatch_core::event_id;
use sentrywatch_core::event_time;
use sentrywatch_core::is_duplicate;
use sentrywatch_core::raw_summary;
use sentrywatch_core::was_notified_recently;

use crate::notifier;
use crate::window::select_window;

/// Upper bound on a persisted tenant status message.
const MAX_STATUS_MESSAGE_LEN: usize = 500;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Run-level configuration independent of the injected collaborators.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Immutable rule id the sink associates with every uploaded row.
    pub sink_rule_id: String,
    /// Log-ingestion stream name.
    pub sink_stream_name: String,
    /// Deadline applied to each individual upstream call.
    pub fetch_timeout: StdDuration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sink_rule_id: String::new(),
            sink_stream_name: String::new(),
            fetch_timeout: StdDuration::from_secs(30),
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives one scheduler tick end to end.
pub struct Orchestrator {
    sign_in_client: Arc<dyn SignInClient>,
    security_alert_client: Arc<dyn SecurityAlertClient>,
    audit_log_client: Arc<dyn AuditLogClient>,
    state_store: Arc<dyn AlertStateStore>,
    config_store: Arc<dyn ConfigStore>,
    sink: Arc<dyn AlertSink>,
    notifier_transport: Arc<dyn NotifierTransport>,
    config: OrchestratorConfig,
}

/// Outcome of processing a single tenant for one tick.
enum TenantRunOutcome {
    /// All three sources were fetched and processed cleanly.
    Success { alerts: Vec<Alert>, events: u64, until: OffsetDateTime },
    /// Sign-in and security-alert data was processed, but the audit source
    /// was skipped because audit logging is disabled for this tenant.
    Degraded { alerts: Vec<Alert>, events: u64, until: OffsetDateTime, status: TenantStatus, message: String },
    /// The tenant's run could not complete; `last_poll` is left unchanged.
    Failed { status: TenantStatus, message: String },
}

impl Orchestrator {
    /// Builds an orchestrator from its injected collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "every field is a distinct required collaborator")]
    pub fn new(
        sign_in_client: Arc<dyn SignInClient>,
        security_alert_client: Arc<dyn SecurityAlertClient>,
        audit_log_client: Arc<dyn AuditLogClient>,
        state_store: Arc<dyn AlertStateStore>,
        config_store: Arc<dyn ConfigStore>,
        sink: Arc<dyn AlertSink>,
        notifier_transport: Arc<dyn NotifierTransport>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            sign_in_client,
            security_alert_client,
            audit_log_client,
            state_store,
            config_store,
            sink,
            notifier_transport,
            config,
        }
    }

    /// Runs one full tick: loads rules and tenants, processes every tenant
    /// sequentially, ingests the batch, notifies, sweeps, and records a
    /// [`RunSummary`]. Never panics; every failure degrades the run status
    /// instead of propagating.
    pub async fn run_once(&self, now: OffsetDateTime) -> RunSummary {
        let wall_clock_start = std::time::Instant::now();

        let rules = match self.config_store.list_rules().await {
            Ok(rules) => rules,
            Err(err) => {
                tracing::error!(error = %err, "failed to load rule catalog, aborting run");
                return self.finish(now, wall_clock_start, 0, 0, 0, RunStatus::Error, Some(truncate(format!("rule catalog load failed: {err}")))).await;
            }
        };

        let tenants = match self.config_store.list_tenants().await {
            Ok(tenants) => tenants,
            Err(err) => {
                tracing::error!(error = %err, "failed to list tenants, aborting run");
                return self.finish(now, wall_clock_start, 0, 0, 0, RunStatus::Error, Some(truncate(format!("tenant list failed: {err}")))).await;
            }
        };

        let alerts_config = self.config_store.get_alerts_config().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load alert delivery config, disabling notifier for this run");
            AlertDeliveryConfig { enabled: false, webhook_url: None, minimum_severity: Severity::Low }
        });

        let clients_checked = tenants.len() as u64;
        let mut all_alerts = Vec::new();
        let mut events_processed = 0_u64;
        let mut degraded = false;
        let mut first_issue: Option<String> = None;

        for tenant in &tenants {
            let span = tracing::info_span!("tenant_run", tenant_id = %tenant.id);
            let outcome = self.process_tenant(tenant, &rules, now).instrument(span).await;
            match outcome {
                TenantRunOutcome::Success { alerts, events, until } => {
                    events_processed += events;
                    all_alerts.extend(alerts);
                    self.persist_tenant_status(&tenant.id, TenantStatus::Success, None, Some(until)).await;
                }
                TenantRunOutcome::Degraded { alerts, events, until, status, message } => {
                    degraded = true;
                    first_issue.get_or_insert_with(|| message.clone());
                    events_processed += events;
                    all_alerts.extend(alerts);
                    self.persist_tenant_status(&tenant.id, status, Some(message), Some(until)).await;
                }
                TenantRunOutcome::Failed { status, message } => {
                    degraded = true;
                    first_issue.get_or_insert_with(|| message.clone());
                    tracing::warn!(status = ?status, message = %message, "tenant run failed, last_poll unchanged");
                    self.persist_tenant_status(&tenant.id, status, Some(message), None).await;
                }
            }
        }

        let alerts_generated = all_alerts.len() as u64;

        let sink_failed = if all_alerts.is_empty() {
            false
        } else {
            match self.sink.upload(&self.config.sink_rule_id, &self.config.sink_stream_name, &all_alerts).await {
                Ok(()) => false,
                Err(err) => {
                    tracing::error!(error = %err, "sink upload failed");
                    first_issue.get_or_insert_with(|| err.to_string());
                    true
                }
            }
        };

        let notifier_failed = match notifier::notify(self.notifier_transport.as_ref(), &alerts_config, &all_alerts).await {
            Ok(_sent) => false,
            Err(err) => {
                tracing::error!(error = %err, "notifier post failed");
                first_issue.get_or_insert_with(|| err.to_string());
                true
            }
        };

        if let Err(err) = self.state_store.sweep(now).await {
            tracing::warn!(error = %err, "alert-state sweep failed");
        }

        let status = if degraded || sink_failed || notifier_failed { RunStatus::Partial } else { RunStatus::Success };
        self.finish(now, wall_clock_start, clients_checked, events_processed, alerts_generated, status, first_issue.map(truncate)).await
    }

    /// Builds, persists (best-effort), and returns the final [`RunSummary`].
    async fn finish(
        &self,
        start_time: OffsetDateTime,
        wall_clock_start: std::time::Instant,
        clients_checked: u64,
        events_processed: u64,
        alerts_generated: u64,
        status: RunStatus,
        error_message: Option<String>,
    ) -> RunSummary {
        let duration_ms = u64::try_from(wall_clock_start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summary = RunSummary {
            start_time,
            end_time: OffsetDateTime::now_utc(),
            duration_ms,
            clients_checked,
            events_processed,
            alerts_generated,
            status,
            error_message,
        };
        if let Err(err) = self.config_store.append_run_summary(&summary).await {
            tracing::warn!(error = %err, "failed to persist run summary");
        }
        summary
    }

    /// Best-effort tenant status write; a failure here is logged and
    /// otherwise swallowed per the alert-state/config-store failure policy.
    async fn persist_tenant_status(
        &self,
        tenant_id: &sentrywatch_core::TenantId,
        status: TenantStatus,
        message: Option<String>,
        last_poll: Option<OffsetDateTime>,
    ) {
        if let Err(err) = self.config_store.update_tenant_status(tenant_id, status, message, last_poll).await {
            tracing::warn!(error = %err, "failed to persist tenant status");
        }
    }

    /// Processes one tenant: selects its window, bootstraps the audit
    /// subscription, fans out the three fetches concurrently, and runs
    /// every fetched event through the evaluator and alert-state machine.
    async fn process_tenant(&self, tenant: &Tenant, rules: &[Rule], now: OffsetDateTime) -> TenantRunOutcome {
        let (since, until) = select_window(tenant.last_poll, now);

        let audit_disabled_message = match self.timeout_call(self.audit_log_client.ensure_subscription(&tenant.id)).await {
            Ok(Ok(())) => None,
            Ok(Err(ClientError::AuditLogDisabled(message))) => {
                tracing::warn!(message = %message, "audit log disabled for tenant, skipping audit fetch only");
                Some(message)
            }
            Ok(Err(err)) => return TenantRunOutcome::Failed { status: err.tenant_status(), message: truncate(err.to_string()) },
            Err(_elapsed) => {
                return TenantRunOutcome::Failed { status: TenantStatus::Error, message: "audit subscription bootstrap timed out".to_string() };
            }
        };

        let sign_in_fut = self.timeout_call(self.sign_in_client.fetch_since(&tenant.id, since, until));
        let security_alert_fut = self.timeout_call(self.security_alert_client.fetch_since(&tenant.id, since, until));
        let audit_fut = async {
            if audit_disabled_message.is_some() {
                Ok(Ok(Vec::new()))
            } else {
                self.timeout_call(self.audit_log_client.fetch_since(&tenant.id, since, until)).await
            }
        };

        let (sign_in_result, security_alert_result, audit_result) = tokio::join!(sign_in_fut, security_alert_fut, audit_fut);

        let sign_in_events = match flatten_fetch(sign_in_result, "sign-in") {
            Ok(events) => events,
            Err(outcome) => return outcome,
        };
        let security_alert_events = match flatten_fetch(security_alert_result, "security-alert") {
            Ok(events) => events,
            Err(outcome) => return outcome,
        };
        let audit_events = match flatten_fetch(audit_result, "audit-log") {
            Ok(events) => events,
            Err(outcome) => return outcome,
        };

        let mut alerts = Vec::new();
        let mut events_processed = 0_u64;
        for (source, events) in [
            (SourceType::SignIn, sign_in_events),
            (SourceType::SecurityAlert, security_alert_events),
            (SourceType::AuditLog, audit_events),
        ] {
            for event in events {
                events_processed += 1;
                if let Some(alert) = self.process_event(tenant, rules, source, &event, now).await {
                    alerts.push(alert);
                }
            }
        }

        match audit_disabled_message {
            Some(message) => TenantRunOutcome::Degraded {
                alerts,
                events: events_processed,
                until,
                status: TenantStatus::AuditLogDisabled,
                message,
            },
            None => TenantRunOutcome::Success { alerts, events: events_processed, until },
        }
    }

    /// Applies the evaluator and the two-layer alert-state machine to a
    /// single event, returning the emitted [`Alert`] when the event
    /// produces one.
    async fn process_event(&self, tenant: &Tenant, rules: &[Rule], source: SourceType, event: &EventTree, now: OffsetDateTime) -> Option<Alert> {
        let rule = evaluate(event, source, rules, Some(&tenant.id))?;
        let user = acting_user(source, event);
        let event_time = match event_time(source, event) {
            Ok(time) => time,
            Err(err) => {
                tracing::warn!(error = %err, %source, "skipping event with unparseable timestamp");
                return None;
            }
        };

        let key = alert_state_key(&tenant.id, &rule.name, &user);

        let dedup_entry = match self.state_store.get_dedup(&key).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "dedup read failed, treating entry as absent");
                None
            }
        };
        if dedup_entry.as_ref().is_some_and(|entry| is_duplicate(entry, event_time)) {
            return None;
        }
        if let Err(err) = self
            .state_store
            .put_dedup(&key, DedupEntry { timestamp: event_time, rule_name: rule.name.clone(), user: user.clone() })
            .await
        {
            tracing::warn!(error = %err, "dedup write failed, alert proceeds at-least-once");
        }

        let severity = rule.effective_severity();
        let should_notify = self.apply_notification_throttle(&key, severity, &rule.name, &user, now).await;

        Some(Alert {
            time_generated: event_time,
            time_processed: now,
            tenant_id: tenant.id.clone(),
            tenant_name: tenant.name.clone(),
            user,
            rule_name: rule.name.clone(),
            severity,
            description: rule.description.clone(),
            source,
            source_event_id: event_id(source, event),
            raw_summary: raw_summary(source, event),
            should_notify,
        })
    }

    /// Decides `should_notify` for an admitted alert and upserts the
    /// notification table accordingly. Critical severity bypasses the
    /// throttle unconditionally.
    async fn apply_notification_throttle(
        &self,
        key: &sentrywatch_core::AlertStateKey,
        severity: Severity,
        rule_name: &str,
        user: &str,
        now: OffsetDateTime,
    ) -> bool {
        let existing = match self.state_store.get_notification(key).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "notification read failed, treating entry as absent");
                None
            }
        };

        if severity.bypasses_throttle() {
            let alert_count = existing.map_or(1, |entry| entry.alert_count + 1);
            self.record_notification(key, rule_name, user, alert_count, now).await;
            return true;
        }

        if existing.as_ref().is_some_and(|entry| was_notified_recently(entry, now)) {
            return false;
        }
        let alert_count = existing.map_or(1, |entry| entry.alert_count + 1);
        self.record_notification(key, rule_name, user, alert_count, now).await;
        true
    }

    /// Best-effort notification-table upsert.
    async fn record_notification(&self, key: &sentrywatch_core::AlertStateKey, rule_name: &str, user: &str, alert_count: u64, now: OffsetDateTime) {
        let entry = NotificationEntry { last_notified: now, alert_count, rule_name: rule_name.to_string(), user: user.to_string() };
        if let Err(err) = self.state_store.put_notification(key, entry).await {
            tracing::warn!(error = %err, "notification write failed");
        }
    }

    /// Wraps `future` with this orchestrator's per-call fetch deadline.
    async fn timeout_call<F, T>(&self, future: F) -> Result<T, Elapsed>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(self.config.fetch_timeout, future).await
    }
}

// ============================================================================
// SECTION: Fetch Result Flattening
// ============================================================================

/// Flattens a timed-out-or-classified fetch result into either its events or
/// a terminal [`TenantRunOutcome::Failed`].
fn flatten_fetch(
    result: Result<Result<Vec<EventTree>, ClientError>, Elapsed>,
    label: &str,
) -> Result<Vec<EventTree>, TenantRunOutcome> {
    match result {
        Ok(Ok(events)) => Ok(events),
        Ok(Err(err)) => Err(TenantRunOutcome::Failed { status: err.tenant_status(), message: truncate(format!("{label} fetch failed: {err}")) }),
        Err(_elapsed) => Err(TenantRunOutcome::Failed { status: TenantStatus::Error, message: format!("{label} fetch timed out") }),
    }
}

/// Truncates a diagnostic message to [`MAX_STATUS_MESSAGE_LEN`] characters.
fn truncate(message: String) -> String {
    if message.chars().count() <= MAX_STATUS_MESSAGE_LEN {
        return message;
    }
    message.chars().take(MAX_STATUS_MESSAGE_LEN).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use time::macros::datetime;

    use sentrywatch_core::AlertStateKey;
    use sentrywatch_core::ConditionSet;
    use sentrywatch_core::ConfigStoreError;
    use sentrywatch_core::MatchMode;
    use sentrywatch_core::Operator;
    use sentrywatch_core::Rule;
    use sentrywatch_core::RuleId;
    use sentrywatch_core::RuleMetadata;
    use sentrywatch_core::SinkError;
    use sentrywatch_core::StoreError;
    use sentrywatch_core::Tenant;
    use sentrywatch_core::TenantId;

    use super::*;

    struct FakeSignIn {
        fail_tenants: Vec<TenantId>,
    }

    #[async_trait]
    impl SignInClient for FakeSignIn {
        async fn fetch_since(&self, tenant_id: &TenantId, _since: OffsetDateTime, _now: OffsetDateTime) -> Result<Vec<EventTree>, ClientError> {
            if self.fail_tenants.contains(tenant_id) {
                return Err(ClientError::AppNotConsented("no consent".to_string()));
            }
            Ok(vec![json!({"id": "s1", "createdDateTime": "2026-07-29T12:00:00Z", "userPrincipalName": "alice@example.com"})])
        }
    }

    struct FakeSecurityAlert;

    #[async_trait]
    impl SecurityAlertClient for FakeSecurityAlert {
        async fn fetch_since(&self, _tenant_id: &TenantId, _since: OffsetDateTime, _now: OffsetDateTime) -> Result<Vec<EventTree>, ClientError> {
            Ok(Vec::new())
        }
    }

    struct FakeAuditLog;

    #[async_trait]
    impl AuditLogClient for FakeAuditLog {
        async fn ensure_subscription(&self, _tenant_id: &TenantId) -> Result<(), ClientError> {
            Ok(())
        }

        async fn fetch_since(&self, _tenant_id: &TenantId, _since: OffsetDateTime, _now: OffsetDateTime) -> Result<Vec<EventTree>, ClientError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeStateStore {
        dedup: Mutex<BTreeMap<AlertStateKey, DedupEntry>>,
        notification: Mutex<BTreeMap<AlertStateKey, NotificationEntry>>,
    }

    #[async_trait]
    impl AlertStateStore for FakeStateStore {
        async fn get_dedup(&self, key: &AlertStateKey) -> Result<Option<DedupEntry>, StoreError> {
            Ok(self.dedup.lock().expect("lock").get(key).cloned())
        }

        async fn put_dedup(&self, key: &AlertStateKey, entry: DedupEntry) -> Result<(), StoreError> {
            self.dedup.lock().expect("lock").insert(key.clone(), entry);
            Ok(())
        }

        async fn get_notification(&self, key: &AlertStateKey) -> Result<Option<NotificationEntry>, StoreError> {
            Ok(self.notification.lock().expect("lock").get(key).cloned())
        }

        async fn put_notification(&self, key: &AlertStateKey, entry: NotificationEntry) -> Result<(), StoreError> {
            self.notification.lock().expect("lock").insert(key.clone(), entry);
            Ok(())
        }

        async fn sweep(&self, _now: OffsetDateTime) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeConfigStore {
        tenants: Vec<Tenant>,
        rules: Vec<Rule>,
        statuses: Mutex<BTreeMap<String, (TenantStatus, Option<OffsetDateTime>)>>,
    }

    #[async_trait]
    impl ConfigStore for FakeConfigStore {
        async fn list_tenants(&self) -> Result<Vec<Tenant>, ConfigStoreError> {
            Ok(self.tenants.clone())
        }

        async fn update_tenant_status(
            &self,
            tenant_id: &TenantId,
            status: TenantStatus,
            _message: Option<String>,
            last_poll: Option<OffsetDateTime>,
        ) -> Result<(), ConfigStoreError> {
            self.statuses.lock().expect("lock").insert(tenant_id.as_str().to_string(), (status, last_poll));
            Ok(())
        }

        async fn get_alerts_config(&self) -> Result<AlertDeliveryConfig, ConfigStoreError> {
            Ok(AlertDeliveryConfig { enabled: false, webhook_url: None, minimum_severity: Severity::Low })
        }

        async fn list_rules(&self) -> Result<Vec<Rule>, ConfigStoreError> {
            Ok(self.rules.clone())
        }

        async fn append_run_summary(&self, _summary: &RunSummary) -> Result<(), ConfigStoreError> {
            Ok(())
        }

        async fn list_run_summaries(&self, _limit: usize) -> Result<Vec<RunSummary>, ConfigStoreError> {
            Ok(Vec::new())
        }
    }

    struct NoopSink;

    #[async_trait]
    impl AlertSink for NoopSink {
        async fn upload(&self, _rule_id: &str, _stream_name: &str, _rows: &[Alert]) -> Result<(), SinkError> {
            Ok(())
        }
    }

    struct NoopTransport;

    #[async_trait]
    impl NotifierTransport for NoopTransport {
        async fn post_card(&self, _webhook_url: &str, _payload: &serde_json::Value) -> Result<(), sentrywatch_core::NotifierTransportError> {
            Ok(())
        }
    }

    fn always_matches_rule() -> Rule {
        Rule {
            id: RuleId::new("always-matches"),
            name: "Always Matches".to_string(),
            description: "matches every sign-in event".to_string(),
            severity: Some(Severity::Medium),
            enabled: true,
            source: SourceType::SignIn,
            conditions: ConditionSet {
                match_mode: MatchMode::All,
                rules: vec![sentrywatch_core::Condition { field: "id".to_string(), operator: Operator::Exists, value: None }],
            },
            exceptions: Vec::new(),
            tenant_ids: None,
            metadata: RuleMetadata::default(),
        }
    }

    #[tokio::test]
    async fn s6_per_tenant_isolation() {
        let tenant_a = Tenant::new(TenantId::new("tenant-a"), "Tenant A");
        let tenant_b = Tenant::new(TenantId::new("tenant-b"), "Tenant B");
        let config_store = Arc::new(FakeConfigStore {
            tenants: vec![tenant_a.clone(), tenant_b.clone()],
            rules: vec![always_matches_rule()],
            statuses: Mutex::new(BTreeMap::new()),
        });

        let orchestrator = Orchestrator::new(
            Arc::new(FakeSignIn { fail_tenants: vec![tenant_a.id.clone()] }),
            Arc::new(FakeSecurityAlert),
            Arc::new(FakeAuditLog),
            Arc::new(FakeStateStore::default()),
            config_store.clone(),
            Arc::new(NoopSink),
            Arc::new(NoopTransport),
            OrchestratorConfig::default(),
        );

        let now = datetime!(2026-07-29 12:00:00 UTC);
        let summary = orchestrator.run_once(now).await;

        assert_eq!(summary.status, RunStatus::Partial);
        let statuses = config_store.statuses.lock().expect("lock");
        let (status_a, last_poll_a) = statuses.get("tenant-a").expect("tenant a recorded");
        assert_eq!(*status_a, TenantStatus::AppNotConsented);
        assert!(last_poll_a.is_none());

        let (status_b, last_poll_b) = statuses.get("tenant-b").expect("tenant b recorded");
        assert_eq!(*status_b, TenantStatus::Success);
        assert_eq!(*last_poll_b, Some(now));
    }

    #[tokio::test]
    async fn s3_dedup_window_suppresses_repeat_within_five_minutes() {
        let tenant = Tenant::new(TenantId::new("tenant-a"), "Tenant A");
        let config_store = Arc::new(FakeConfigStore {
            tenants: vec![tenant.clone()],
            rules: vec![always_matches_rule()],
            statuses: Mutex::new(BTreeMap::new()),
        });
        let state_store = Arc::new(FakeStateStore::default());

        let orchestrator = Orchestrator::new(
            Arc::new(FakeSignIn { fail_tenants: Vec::new() }),
            Arc::new(FakeSecurityAlert),
            Arc::new(FakeAuditLog),
            state_store,
            config_store,
            Arc::new(NoopSink),
            Arc::new(NoopTransport),
            OrchestratorConfig::default(),
        );

        let now = datetime!(2026-07-29 12:00:00 UTC);
        let first_run = orchestrator.run_once(now).await;
        assert_eq!(first_run.alerts_generated, 1);

        let second_run = orchestrator.run_once(now).await;
        assert_eq!(second_run.alerts_generated, 0, "same event fetched again within the dedup window must be suppressed");
    }
}
