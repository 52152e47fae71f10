// sentrywatch-store-sqlite/src/memory.rs
// ============================================================================
// Module: In-Memory Store
// Description: Simple in-memory AlertStateStore and ConfigStore implementation.
// Purpose: Provide a deterministic store for tests and local runs without a
// database file.
// Dependencies: sentrywatch-core, sentrywatch-config, tokio::sync
// ============================================================================

//! ## Overview
//! [`InMemoryStore`] is not durable across process restarts; it exists for
//! tests and local `run-once` demos where spinning up a `SQLite` file is
//! unnecessary ceremony.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use sentrywatch_core::AlertDeliveryConfig;
use sentrywatch_core::AlertStateKey;
use sentrywatch_core::AlertStateStore;
use sentrywatch_core::ConfigStore;
use sentrywatch_core::ConfigStoreError;
use sentrywatch_core::DedupEntry;
use sentrywatch_core::NotificationEntry;
use sentrywatch_core::Rule;
use sentrywatch_core::RunSummary;
use sentrywatch_core::Severity;
use sentrywatch_core::StoreError;
use sentrywatch_core::Tenant;
use sentrywatch_core::TenantId;
use sentrywatch_core::TenantStatus;
use sentrywatch_core::alert::DEDUP_WINDOW_SECS;
use sentrywatch_core::alert::NOTIFICATION_WINDOW_SECS;

/// In-process state guarded by a single lock; cheap enough that holding it
/// across these short, allocation-only operations is not a contention
/// concern.
#[derive(Default)]
struct State {
    /// Dedup-table rows.
    dedup: BTreeMap<AlertStateKey, DedupEntry>,
    /// Notification-table rows.
    notifications: BTreeMap<AlertStateKey, NotificationEntry>,
    /// Tenant records, keyed by tenant id.
    tenants: BTreeMap<TenantId, Tenant>,
    /// Current alert-delivery configuration.
    alerts_config: AlertDeliveryConfig,
    /// Run summaries in append order; `list_run_summaries` reverses.
    run_summaries: Vec<RunSummary>,
}

/// In-memory [`AlertStateStore`] and [`ConfigStore`] for tests and local runs.
#[derive(Clone)]
pub struct InMemoryStore {
    /// Shared, mutex-guarded state.
    state: Arc<Mutex<State>>,
    /// Directory the rule catalog is (re)loaded from on every
    /// `list_rules` call.
    rule_catalog_dir: PathBuf,
}

impl InMemoryStore {
    /// Creates an empty in-memory store with no alert-delivery
    /// configuration (delivery disabled) and a rule catalog rooted at
    /// `rule_catalog_dir`.
    #[must_use]
    pub fn new(rule_catalog_dir: PathBuf) -> Self {
        let state = State {
            alerts_config: AlertDeliveryConfig { enabled: false, webhook_url: None, minimum_severity: Severity::Low },
            ..State::default()
        };
        Self { state: Arc::new(Mutex::new(state)), rule_catalog_dir }
    }
}

#[async_trait]
impl AlertStateStore for InMemoryStore {
    async fn get_dedup(&self, key: &AlertStateKey) -> Result<Option<DedupEntry>, StoreError> {
        Ok(self.state.lock().await.dedup.get(key).cloned())
    }

    async fn put_dedup(&self, key: &AlertStateKey, entry: DedupEntry) -> Result<(), StoreError> {
        self.state.lock().await.dedup.insert(key.clone(), entry);
        Ok(())
    }

    async fn get_notification(&self, key: &AlertStateKey) -> Result<Option<NotificationEntry>, StoreError> {
        Ok(self.state.lock().await.notifications.get(key).cloned())
    }

    async fn put_notification(&self, key: &AlertStateKey, entry: NotificationEntry) -> Result<(), StoreError> {
        self.state.lock().await.notifications.insert(key.clone(), entry);
        Ok(())
    }

    async fn sweep(&self, now: OffsetDateTime) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        guard
            .dedup
            .retain(|_, entry| (now - entry.timestamp).whole_seconds() < DEDUP_WINDOW_SECS);
        guard
            .notifications
            .retain(|_, entry| (now - entry.last_notified).whole_seconds() < NOTIFICATION_WINDOW_SECS);
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for InMemoryStore {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ConfigStoreError> {
        Ok(self.state.lock().await.tenants.values().cloned().collect())
    }

    async fn update_tenant_status(
        &self,
        tenant_id: &TenantId,
        status: TenantStatus,
        message: Option<String>,
        last_poll: Option<OffsetDateTime>,
    ) -> Result<(), ConfigStoreError> {
        let mut guard = self.state.lock().await;
        let tenant = guard.tenants.entry(tenant_id.clone()).or_insert_with(|| Tenant::new(tenant_id.clone(), tenant_id.as_str()));
        tenant.status = status;
        tenant.status_message = message;
        if last_poll.is_some() {
            tenant.last_poll = last_poll;
        }
        Ok(())
    }

    async fn get_alerts_config(&self) -> Result<AlertDeliveryConfig, ConfigStoreError> {
        Ok(self.state.lock().await.alerts_config.clone())
    }

    async fn list_rules(&self) -> Result<Vec<Rule>, ConfigStoreError> {
        let rules = sentrywatch_config::load_catalog(&self.rule_catalog_dir)
            .map_err(|err| ConfigStoreError::Backend(err.to_string()))?;
        Ok(rules.into_values().collect())
    }

    async fn append_run_summary(&self, summary: &RunSummary) -> Result<(), ConfigStoreError> {
        let mut guard = self.state.lock().await;
        guard.run_summaries.push(summary.clone());
        let cutoff = summary.start_time - time::Duration::days(sentrywatch_core::alert::RUN_HISTORY_RETENTION_DAYS);
        guard.run_summaries.retain(|row| row.start_time >= cutoff);
        Ok(())
    }

    async fn list_run_summaries(&self, limit: usize) -> Result<Vec<RunSummary>, ConfigStoreError> {
        let guard = self.state.lock().await;
        Ok(guard.run_summaries.iter().rev().take(limit).cloned().collect())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
