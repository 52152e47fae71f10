// sentrywatch-cli/src/main.rs
// ============================================================================
// Module: Sentrywatch CLI
// Description: Process entry point wiring every concrete adapter together.
// Purpose: Load startup configuration, build the orchestrator, and run it
// either once (`run-once`) or forever (`serve`).
// Dependencies: every other workspace crate, clap, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! This binary performs no domain logic of its own. It reads
//! [`EngineConfig`] from the environment, constructs the HTTP-backed
//! upstream clients and `SQLite` store from `sentrywatch-providers` and
//! `sentrywatch-store-sqlite`, builds an [`Orchestrator`] over them, and
//! hands it to a [`Scheduler`] driven by one of two subcommands:
//! `run-once` (a single tick, suited to a cron job or `Kubernetes CronJob`)
//! or `serve` (an in-process loop on the configured poll interval).

// ============================================================================
// SECTION: Modules
// ============================================================================

mod token_provider;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;

use sentrywatch_broker::Orchestrator;
use sentrywatch_broker::OrchestratorConfig;
use sentrywatch_broker::Scheduler;
use sentrywatch_config::EngineConfig;
use sentrywatch_core::AlertSink;
use sentrywatch_core::AlertStateStore;
use sentrywatch_core::AuditLogClient;
use sentrywatch_core::ConfigStore;
use sentrywatch_core::NotifierTransport;
use sentrywatch_core::RunStatus;
use sentrywatch_core::SecurityAlertClient;
use sentrywatch_core::SignInClient;
use sentrywatch_providers::BoundedHttpClient;
use sentrywatch_providers::GraphClient;
use sentrywatch_providers::HttpAlertSink;
use sentrywatch_providers::HttpAuditLogClient;
use sentrywatch_providers::HttpClientConfig;
use sentrywatch_providers::HttpSecurityAlertClient;
use sentrywatch_providers::HttpSignInClient;
use sentrywatch_providers::HttpWebhookTransport;
use sentrywatch_providers::TokenCache;
use sentrywatch_store_sqlite::SqliteStore;
use sentrywatch_store_sqlite::SqliteStoreConfig;

use token_provider::ClientCredentialsTokenProvider;

/// Root of every Graph-style upstream path (`auditLogs/signIns`,
/// `security/alerts_v2`, `audit/management/activityfeed`).
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";
/// Per-tenant client-credentials token endpoint template.
const TOKEN_ENDPOINT_TEMPLATE: &str = "https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token";
/// Scope requested for upstream log reads.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Scope requested for the sink's own ingestion identity.
const SINK_SCOPE: &str = "https://monitor.azure.com/.default";

// ============================================================================
// SECTION: CLI Surface
// ============================================================================

/// Top-level command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "sentrywatch", about = "Multi-tenant security-event polling and alerting engine")]
struct Cli {
    /// Subcommand selecting a single tick or the in-process scheduler loop.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs exactly one tick across every monitored tenant, then exits.
    RunOnce,
    /// Runs the in-process scheduler loop on the configured poll interval.
    Serve,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point: loads configuration, wires adapters, and dispatches
/// to the selected subcommand.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "startup configuration failed");
            return ExitCode::FAILURE;
        }
    };

    let scheduler = match build_scheduler(&config) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize engine");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::RunOnce => {
            let summary = scheduler.run_once().await;
            tracing::info!(
                status = ?summary.status,
                clients_checked = summary.clients_checked,
                events_processed = summary.events_processed,
                alerts_generated = summary.alerts_generated,
                "run-once complete"
            );
            if summary.status == RunStatus::Error {
                return ExitCode::FAILURE;
            }
        }
        Command::Serve => scheduler.serve().await,
    }

    ExitCode::SUCCESS
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Builds every concrete adapter and assembles the [`Scheduler`] that drives
/// them.
fn build_scheduler(config: &EngineConfig) -> Result<Scheduler, String> {
    let http = BoundedHttpClient::new(HttpClientConfig::default()).map_err(|err| err.to_string())?;
    let graph_base_url = reqwest::Url::parse(GRAPH_BASE_URL).map_err(|err| err.to_string())?;

    let graph_tokens = Arc::new(TokenCache::new(ClientCredentialsTokenProvider::new(
        http.clone(),
        TOKEN_ENDPOINT_TEMPLATE.to_string(),
        config.client_id.clone(),
        config.credential.clone(),
        GRAPH_SCOPE.to_string(),
    )));

    let sign_in_graph = GraphClient::new(http.clone(), graph_tokens.clone(), graph_base_url.clone());
    let security_alert_graph = GraphClient::new(http.clone(), graph_tokens.clone(), graph_base_url.clone());
    let audit_log_graph = GraphClient::new(http.clone(), graph_tokens, graph_base_url);

    let sign_in_client: Arc<dyn SignInClient> = Arc::new(HttpSignInClient::new(sign_in_graph));
    let security_alert_client: Arc<dyn SecurityAlertClient> = Arc::new(HttpSecurityAlertClient::new(security_alert_graph));
    let audit_log_client: Arc<dyn AuditLogClient> = Arc::new(HttpAuditLogClient::new(audit_log_graph));

    let sink_tokens = TokenCache::new(ClientCredentialsTokenProvider::new(
        http.clone(),
        TOKEN_ENDPOINT_TEMPLATE.to_string(),
        config.client_id.clone(),
        config.credential.clone(),
        SINK_SCOPE.to_string(),
    ));
    let sink: Arc<dyn AlertSink> =
        Arc::new(HttpAlertSink::new(http.clone(), sink_tokens, config.sink_endpoint.clone(), config.msp_tenant_id.clone()));

    let notifier_transport: Arc<dyn NotifierTransport> = Arc::new(HttpWebhookTransport::new(http));

    let store_config = SqliteStoreConfig::new(sqlite_path(&config.storage_connection_string));
    let store = Arc::new(SqliteStore::open(&store_config, config.rule_catalog_dir.clone()).map_err(|err| err.to_string())?);
    let state_store: Arc<dyn AlertStateStore> = store.clone();
    let config_store: Arc<dyn ConfigStore> = store;

    let orchestrator_config = OrchestratorConfig {
        sink_rule_id: config.sink_rule_id.clone(),
        sink_stream_name: config.sink_stream_name.clone(),
        fetch_timeout: Duration::from_secs(30),
    };

    let orchestrator = Orchestrator::new(
        sign_in_client,
        security_alert_client,
        audit_log_client,
        state_store,
        config_store,
        sink,
        notifier_transport,
        orchestrator_config,
    );

    Ok(Scheduler::new(orchestrator, Duration::from_secs(config.poll_interval_secs)))
}

/// Strips an optional `sqlite://` scheme prefix from a storage connection
/// string, leaving a plain filesystem path (or `:memory:`) for
/// [`SqliteStoreConfig`].
fn sqlite_path(storage_connection_string: &str) -> std::path::PathBuf {
    storage_connection_string.strip_prefix("sqlite://").unwrap_or(storage_connection_string).into()
}
