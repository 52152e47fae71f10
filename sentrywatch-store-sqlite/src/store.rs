// sentrywatch-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Alert-State and Configuration Store
// Description: Durable AlertStateStore and ConfigStore backed by SQLite.
// Purpose: Persist dedup/notification rows, tenants, delivery config, and
// run history across process restarts.
// Dependencies: sentrywatch-core, sentrywatch-config, rusqlite, tokio::sync
// ============================================================================

//! ## Overview
//! [`SqliteStore`] implements both [`AlertStateStore`] and [`ConfigStore`]
//! against one `SQLite` connection, guarded by a `tokio::sync::Mutex` so the
//! async trait methods can hold it across the (short, local) blocking calls
//! into `rusqlite`. Row payloads are stored as canonical JSON blobs next to
//! their key columns, mirroring how a schema registry stores an opaque
//! document alongside its lookup key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use sentrywatch_core::AlertDeliveryConfig;
use sentrywatch_core::AlertStateKey;
use sentrywatch_core::AlertStateStore;
use sentrywatch_core::ConfigStore;
use sentrywatch_core::ConfigStoreError;
use sentrywatch_core::DedupEntry;
use sentrywatch_core::NotificationEntry;
use sentrywatch_core::RunSummary;
use sentrywatch_core::StoreError;
use sentrywatch_core::Tenant;
use sentrywatch_core::TenantId;
use sentrywatch_core::TenantStatus;
use sentrywatch_core::alert::DEDUP_WINDOW_SECS;
use sentrywatch_core::alert::NOTIFICATION_WINDOW_SECS;
use sentrywatch_core::alert::RUN_HISTORY_RETENTION_DAYS;

use crate::SqliteStoreConfig;
use crate::SqliteStoreError;
use crate::schema::initialize_schema;
use crate::schema::open_connection;

/// Reserved tenant id for the placeholder row `list_tenants` always filters
/// out (an empty catalog would otherwise report zero monitored tenants
/// indistinguishably from "not yet configured").
const PLACEHOLDER_TENANT_ID: &str = "00000000-0000-0000-0000-000000000000";

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed [`AlertStateStore`] and [`ConfigStore`].
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared connection, guarded for exclusive access per call.
    connection: Arc<Mutex<Connection>>,
    /// Directory the rule catalog is (re)loaded from on every
    /// `list_rules` call.
    rule_catalog_dir: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) a store at `config.path`, migrating the schema if
    /// necessary, with a rule catalog rooted at `rule_catalog_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// its schema initialized.
    pub fn open(config: &SqliteStoreConfig, rule_catalog_dir: PathBuf) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        tracing::debug!(path = %config.path.display(), "sqlite store opened and schema initialized");
        Ok(Self { connection: Arc::new(Mutex::new(connection)), rule_catalog_dir })
    }
}

// ============================================================================
// SECTION: AlertStateStore
// ============================================================================

#[async_trait]
impl AlertStateStore for SqliteStore {
    async fn get_dedup(&self, key: &AlertStateKey) -> Result<Option<DedupEntry>, StoreError> {
        let guard = self.connection.lock().await;
        let row: Option<String> = guard
            .query_row(
                "SELECT entry_json FROM dedup_entries WHERE tenant_id = ?1 AND digest = ?2",
                params![key.tenant_id.as_str(), key.digest],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        drop(guard);
        row.map(|json| serde_json::from_str(&json).map_err(|err| StoreError::from(SqliteStoreError::Corrupt(err.to_string()))))
            .transpose()
    }

    async fn put_dedup(&self, key: &AlertStateKey, entry: DedupEntry) -> Result<(), StoreError> {
        let entry_json = serde_json::to_string(&entry)
            .map_err(|err| StoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
        let event_time_unix_ms = entry.timestamp.unix_timestamp() * 1000;
        let guard = self.connection.lock().await;
        guard
            .execute(
                "INSERT INTO dedup_entries (tenant_id, digest, entry_json, event_time_unix_ms)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (tenant_id, digest) DO UPDATE SET
                    entry_json = excluded.entry_json,
                    event_time_unix_ms = excluded.event_time_unix_ms",
                params![key.tenant_id.as_str(), key.digest, entry_json, event_time_unix_ms],
            )
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        Ok(())
    }

    async fn get_notification(&self, key: &AlertStateKey) -> Result<Option<NotificationEntry>, StoreError> {
        let guard = self.connection.lock().await;
        let row: Option<String> = guard
            .query_row(
                "SELECT entry_json FROM notification_entries WHERE tenant_id = ?1 AND digest = ?2",
                params![key.tenant_id.as_str(), key.digest],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        drop(guard);
        row.map(|json| serde_json::from_str(&json).map_err(|err| StoreError::from(SqliteStoreError::Corrupt(err.to_string()))))
            .transpose()
    }

    async fn put_notification(&self, key: &AlertStateKey, entry: NotificationEntry) -> Result<(), StoreError> {
        let entry_json = serde_json::to_string(&entry)
            .map_err(|err| StoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
        let last_notified_unix_ms = entry.last_notified.unix_timestamp() * 1000;
        let guard = self.connection.lock().await;
        guard
            .execute(
                "INSERT INTO notification_entries (tenant_id, digest, entry_json, last_notified_unix_ms)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (tenant_id, digest) DO UPDATE SET
                    entry_json = excluded.entry_json,
                    last_notified_unix_ms = excluded.last_notified_unix_ms",
                params![key.tenant_id.as_str(), key.digest, entry_json, last_notified_unix_ms],
            )
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        Ok(())
    }

    async fn sweep(&self, now: OffsetDateTime) -> Result<(), StoreError> {
        let now_ms = now.unix_timestamp() * 1000;
        let dedup_cutoff = now_ms - DEDUP_WINDOW_SECS * 1000;
        let notification_cutoff = now_ms - NOTIFICATION_WINDOW_SECS * 1000;
        let guard = self.connection.lock().await;
        let dedup_removed = guard
            .execute("DELETE FROM dedup_entries WHERE event_time_unix_ms < ?1", params![dedup_cutoff])
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let notification_removed = guard
            .execute(
                "DELETE FROM notification_entries WHERE last_notified_unix_ms < ?1",
                params![notification_cutoff],
            )
            .map_err(|err| StoreError::from(SqliteStoreError::Db(err.to_string())))?;
        tracing::debug!(dedup_removed, notification_removed, "alert-state sweep complete");
        Ok(())
    }
}

// ============================================================================
// SECTION: ConfigStore
// ============================================================================

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ConfigStoreError> {
        let guard = self.connection.lock().await;
        let mut statement = guard
            .prepare("SELECT tenant_json FROM tenants WHERE tenant_id != ?1")
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let rows = statement
            .query_map(params![PLACEHOLDER_TENANT_ID], |row| row.get::<_, String>(0))
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let mut tenants = Vec::new();
        for row in rows {
            let json = row.map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
            let tenant: Tenant = serde_json::from_str(&json)
                .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
            tenants.push(tenant);
        }
        Ok(tenants)
    }

    async fn update_tenant_status(
        &self,
        tenant_id: &TenantId,
        status: TenantStatus,
        message: Option<String>,
        last_poll: Option<OffsetDateTime>,
    ) -> Result<(), ConfigStoreError> {
        let guard = self.connection.lock().await;
        let existing: Option<String> = guard
            .query_row("SELECT tenant_json FROM tenants WHERE tenant_id = ?1", params![tenant_id.as_str()], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;

        let mut tenant: Tenant = match existing {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string())))?,
            None => Tenant::new(tenant_id.clone(), tenant_id.as_str()),
        };
        tenant.status = status;
        tenant.status_message = message;
        if last_poll.is_some() {
            tenant.last_poll = last_poll;
        }

        let tenant_json = serde_json::to_string(&tenant)
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
        guard
            .execute(
                "INSERT INTO tenants (tenant_id, tenant_json) VALUES (?1, ?2)
                 ON CONFLICT (tenant_id) DO UPDATE SET tenant_json = excluded.tenant_json",
                params![tenant_id.as_str(), tenant_json],
            )
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        Ok(())
    }

    async fn get_alerts_config(&self) -> Result<AlertDeliveryConfig, ConfigStoreError> {
        let guard = self.connection.lock().await;
        let row: Option<String> = guard
            .query_row("SELECT config_json FROM alerts_config WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        drop(guard);
        match row {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string()))),
            None => Ok(AlertDeliveryConfig { enabled: false, webhook_url: None, minimum_severity: sentrywatch_core::Severity::Low }),
        }
    }

    async fn list_rules(&self) -> Result<Vec<sentrywatch_core::Rule>, ConfigStoreError> {
        let dir = self.rule_catalog_dir.clone();
        let rules = sentrywatch_config::load_catalog(&dir)
            .map_err(|err| ConfigStoreError::Backend(err.to_string()))?;
        Ok(rules.into_values().collect())
    }

    async fn append_run_summary(&self, summary: &RunSummary) -> Result<(), ConfigStoreError> {
        let row_key = run_row_key(summary.start_time);
        let start_time_unix_ms = summary.start_time.unix_timestamp() * 1000;
        let summary_json = serde_json::to_string(summary)
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
        let retention_cutoff_ms = start_time_unix_ms - RUN_HISTORY_RETENTION_DAYS * 24 * 60 * 60 * 1000;

        let guard = self.connection.lock().await;
        guard
            .execute(
                "INSERT INTO run_summaries (row_key, start_time_unix_ms, summary_json) VALUES (?1, ?2, ?3)",
                params![row_key, start_time_unix_ms, summary_json],
            )
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let expired_removed = guard
            .execute("DELETE FROM run_summaries WHERE start_time_unix_ms < ?1", params![retention_cutoff_ms])
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        if expired_removed > 0 {
            tracing::debug!(expired_removed, retention_days = RUN_HISTORY_RETENTION_DAYS, "run history retention sweep complete");
        }
        Ok(())
    }

    async fn list_run_summaries(&self, limit: usize) -> Result<Vec<RunSummary>, ConfigStoreError> {
        let guard = self.connection.lock().await;
        let mut statement = guard
            .prepare("SELECT summary_json FROM run_summaries ORDER BY row_key ASC LIMIT ?1")
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = statement
            .query_map(params![limit_i64], |row| row.get::<_, String>(0))
            .map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
        let mut summaries = Vec::new();
        for row in rows {
            let json = row.map_err(|err| ConfigStoreError::from(SqliteStoreError::Db(err.to_string())))?;
            let summary: RunSummary = serde_json::from_str(&json)
                .map_err(|err| ConfigStoreError::from(SqliteStoreError::Corrupt(err.to_string())))?;
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

/// Derives a lexicographically sortable row key from `start_time` such that
/// ascending key order is newest-first: `i64::MAX - unix_millis`,
/// zero-padded.
fn run_row_key(start_time: OffsetDateTime) -> String {
    let millis = start_time.unix_timestamp() * 1000 + i64::from(start_time.millisecond());
    let inverted = i64::MAX - millis;
    format!("{inverted:020}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use time::Duration;
    use time::OffsetDateTime;

    use sentrywatch_core::AlertStateKey;
    use sentrywatch_core::DedupEntry;
    use sentrywatch_core::RunStatus;
    use sentrywatch_core::RunSummary;
    use sentrywatch_core::TenantId;
    use sentrywatch_core::TenantStatus;

    use super::SqliteStore;
    use crate::SqliteStoreConfig;

    fn open_temp_store(dir: &tempfile::TempDir) -> SqliteStore {
        let db_path = dir.path().join("sentrywatch.sqlite3");
        let config = SqliteStoreConfig::new(db_path);
        SqliteStore::open(&config, dir.path().join("rules")).expect("store opens")
    }

    #[tokio::test]
    async fn round_trips_a_dedup_entry() {
        use sentrywatch_core::AlertStateStore;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_temp_store(&dir);
        let tenant = TenantId::from("tenant-a");
        let key = AlertStateKey { tenant_id: tenant, digest: "abc123".to_string() };
        let entry = DedupEntry { timestamp: OffsetDateTime::now_utc(), rule_name: "Rule".to_string(), user: "alice".to_string() };

        assert!(store.get_dedup(&key).await.expect("read succeeds").is_none());
        store.put_dedup(&key, entry.clone()).await.expect("write succeeds");
        let fetched = store.get_dedup(&key).await.expect("read succeeds").expect("entry present");
        assert_eq!(fetched.rule_name, entry.rule_name);
    }

    #[tokio::test]
    async fn sweep_removes_expired_dedup_entries() {
        use sentrywatch_core::AlertStateStore;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_temp_store(&dir);
        let tenant = TenantId::from("tenant-a");
        let key = AlertStateKey { tenant_id: tenant, digest: "abc123".to_string() };
        let old_time = OffsetDateTime::now_utc() - Duration::hours(2);
        let entry = DedupEntry { timestamp: old_time, rule_name: "Rule".to_string(), user: "alice".to_string() };
        store.put_dedup(&key, entry).await.expect("write succeeds");

        store.sweep(OffsetDateTime::now_utc()).await.expect("sweep succeeds");
        assert!(store.get_dedup(&key).await.expect("read succeeds").is_none());
    }

    #[tokio::test]
    async fn tenant_status_updates_persist_and_filter_placeholder() {
        use sentrywatch_core::ConfigStore;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_temp_store(&dir);
        let tenant = TenantId::from("tenant-a");
        store
            .update_tenant_status(&tenant, TenantStatus::Success, None, Some(OffsetDateTime::now_utc()))
            .await
            .expect("update succeeds");

        let tenants = store.list_tenants().await.expect("list succeeds");
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].status, TenantStatus::Success);
    }

    #[tokio::test]
    async fn run_summaries_are_listed_newest_first() {
        use sentrywatch_core::ConfigStore;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_temp_store(&dir);
        let now = OffsetDateTime::now_utc();
        let earlier = RunSummary {
            start_time: now - Duration::hours(1),
            end_time: now - Duration::hours(1),
            duration_ms: 10,
            clients_checked: 1,
            events_processed: 1,
            alerts_generated: 0,
            status: RunStatus::Success,
            error_message: None,
        };
        let later = RunSummary { start_time: now, ..earlier.clone() };

        store.append_run_summary(&earlier).await.expect("append succeeds");
        store.append_run_summary(&later).await.expect("append succeeds");

        let summaries = store.list_run_summaries(10).await.expect("list succeeds");
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].start_time, later.start_time);
        assert_eq!(summaries[1].start_time, earlier.start_time);
    }
}
