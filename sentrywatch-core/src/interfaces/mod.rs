// sentrywatch-core/src/interfaces/mod.rs
// ============================================================================
// Module: Sentrywatch Interfaces
// Description: Backend-agnostic traits for upstream clients, sinks, and stores.
// Purpose: Define the contract surfaces the orchestrator integrates through.
// Dependencies: crate::core, async-trait, thiserror, time
// ============================================================================

//! ## Overview
//! Interfaces define how the engine integrates with external systems
//! without embedding backend-specific details. These collaborators'
//! internals are out of scope; only their contracts live here.
//! Implementations must never panic and must classify failures per the
//! error taxonomy below.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::alert::Alert;
use crate::core::alert::AlertStateKey;
use crate::core::alert::DedupEntry;
use crate::core::alert::NotificationEntry;
use crate::core::delivery::AlertDeliveryConfig;
use crate::core::event::EventTree;
use crate::core::identifiers::TenantId;
use crate::core::rule::Rule;
use crate::core::run_summary::RunSummary;
use crate::core::tenant::Tenant;
use crate::core::tenant::TenantStatus;

// ============================================================================
// SECTION: Upstream Client Errors
// ============================================================================

/// Error taxonomy for upstream log clients.
///
/// Transient, content-level hiccups on an otherwise-authenticated tenant
/// are swallowed by the implementation (returning an empty list with a
/// logged warning); only the classes below ever reach the
/// orchestrator, each mapping onto one [`TenantStatus`] variant.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The application has not been consented for this tenant.
    #[error("application not consented: {0}")]
    AppNotConsented(String),
    /// The upstream reports the tenant does not exist.
    #[error("tenant not found: {0}")]
    TenantNotFound(String),
    /// The upstream denied access (403-class response).
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Audit logging is disabled for this tenant (audit source only).
    #[error("audit log disabled: {0}")]
    AuditLogDisabled(String),
    /// The call exceeded its deadline.
    #[error("upstream call timed out: {0}")]
    Timeout(String),
    /// Any other upstream or network exception.
    #[error("upstream error: {0}")]
    Other(String),
}

impl ClientError {
    /// Maps this error onto the [`TenantStatus`] the orchestrator records.
    #[must_use]
    pub const fn tenant_status(&self) -> TenantStatus {
        match self {
            Self::AppNotConsented(_) => TenantStatus::AppNotConsented,
            Self::TenantNotFound(_) => TenantStatus::TenantNotFound,
            Self::PermissionDenied(_) => TenantStatus::PermissionDenied,
            Self::AuditLogDisabled(_) => TenantStatus::AuditLogDisabled,
            Self::Timeout(_) | Self::Other(_) => TenantStatus::Error,
        }
    }
}

// ============================================================================
// SECTION: Upstream Clients
// ============================================================================

/// Sign-in log client: `fetchSignIns(tenantId, since, now)`.
#[async_trait]
pub trait SignInClient: Send + Sync {
    /// Fetches sign-in events in the half-open window `[since, now)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for auth-class or otherwise fatal failures.
    /// Transient content-retrieval failures are swallowed internally and
    /// yield an empty `Ok` result instead.
    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError>;
}

/// Security-alert client: `fetchSecurityAlerts(tenantId, since, now)`.
#[async_trait]
pub trait SecurityAlertClient: Send + Sync {
    /// Fetches security alerts in the half-open window `[since, now)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for auth-class or otherwise fatal failures.
    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError>;
}

/// Audit-activity log client: `fetchAuditEvents(tenantId, since, now)`.
///
/// The audit source additionally has an idempotent subscription bootstrap
/// per content-type; a missing-tenant response there classifies as a skip
/// (`AuditLogDisabled`).
#[async_trait]
pub trait AuditLogClient: Send + Sync {
    /// Ensures the audit-content subscriptions this tenant needs exist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuditLogDisabled`] when the tenant does not
    /// exist in the audit-logging sense, or another [`ClientError`] variant
    /// for other bootstrap failures.
    async fn ensure_subscription(&self, tenant_id: &TenantId) -> Result<(), ClientError>;

    /// Fetches audit events in the half-open window `[since, now)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for auth-class or otherwise fatal failures.
    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError>;
}

// ============================================================================
// SECTION: Sink Adapter
// ============================================================================

/// Log-ingestion sink errors.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The upload call failed.
    #[error("sink upload failed: {0}")]
    UploadFailed(String),
}

/// Downstream log-ingestion sink: `upload(ruleId, streamName, rows)`.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Uploads a batch of alert rows in a single call.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on upload failure. An empty batch must be
    /// treated as a no-op by callers before reaching this method.
    async fn upload(&self, rule_id: &str, stream_name: &str, rows: &[Alert]) -> Result<(), SinkError>;
}

// ============================================================================
// SECTION: Notifier Transport
// ============================================================================

/// Chat-webhook notifier errors.
#[derive(Debug, Error)]
pub enum NotifierTransportError {
    /// The webhook responded with a non-2xx status.
    #[error("webhook post failed: {0}")]
    PostFailed(String),
}

/// Chat-webhook transport: an HTTPS POST of a card payload.
#[async_trait]
pub trait NotifierTransport: Send + Sync {
    /// Posts a rendered card payload to the configured webhook.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierTransportError`] on a non-2xx response or
    /// transport failure. Non-2xx responses are reported, not retried
    /// within the run.
    async fn post_card(&self, webhook_url: &str, payload: &serde_json::Value) -> Result<(), NotifierTransportError>;
}

// ============================================================================
// SECTION: Alert-State Store
// ============================================================================

/// Alert-state store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's read or write call failed.
    #[error("alert-state store error: {0}")]
    Backend(String),
}

/// Two-layer, TTL-bounded alert-state store.
#[async_trait]
pub trait AlertStateStore: Send + Sync {
    /// Reads the dedup entry for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a backend failure. Callers must treat a
    /// store error on read as "entry absent".
    async fn get_dedup(&self, key: &AlertStateKey) -> Result<Option<DedupEntry>, StoreError>;

    /// Upserts the dedup entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a backend failure. Callers must let the
    /// alert proceed even when this write fails.
    async fn put_dedup(&self, key: &AlertStateKey, entry: DedupEntry) -> Result<(), StoreError>;

    /// Reads the notification entry for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a backend failure.
    async fn get_notification(&self, key: &AlertStateKey) -> Result<Option<NotificationEntry>, StoreError>;

    /// Upserts the notification entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a backend failure.
    async fn put_notification(&self, key: &AlertStateKey, entry: NotificationEntry) -> Result<(), StoreError>;

    /// Deletes dedup and notification entries older than their TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a backend failure. Not required for
    /// correctness — lookups already apply the TTL — but bounds storage
    ///.
    async fn sweep(&self, now: OffsetDateTime) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Configuration Store
// ============================================================================

/// Configuration store errors.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// The store's read or write call failed.
    #[error("config store error: {0}")]
    Backend(String),
}

/// Configuration storage: tenants, alert-delivery config, rule catalog, and
/// run history.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Lists monitored tenants. Placeholder rows with the reserved
    /// all-zeros tenant id are filtered out by the implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure.
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ConfigStoreError>;

    /// Updates a tenant's terminal status and, on success, its watermark.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure.
    async fn update_tenant_status(
        &self,
        tenant_id: &TenantId,
        status: TenantStatus,
        message: Option<String>,
        last_poll: Option<OffsetDateTime>,
    ) -> Result<(), ConfigStoreError>;

    /// Reads the current alert-delivery configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure.
    async fn get_alerts_config(&self) -> Result<AlertDeliveryConfig, ConfigStoreError>;

    /// Lists the rule catalog, reloaded fresh on every call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure. Individual
    /// malformed documents are skipped with a warning by the
    /// implementation, not surfaced as an error here.
    async fn list_rules(&self) -> Result<Vec<Rule>, ConfigStoreError>;

    /// Appends a run summary row.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure.
    async fn append_run_summary(&self, summary: &RunSummary) -> Result<(), ConfigStoreError>;

    /// Lists run summaries newest-first, bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] on a backend failure.
    async fn list_run_summaries(&self, limit: usize) -> Result<Vec<RunSummary>, ConfigStoreError>;
}
