// sentrywatch-providers/src/sink.rs
// ============================================================================
// Module: HTTP Alert Sink
// Description: Batch-uploads generated alerts to a log-ingestion endpoint.
// Purpose: Implement sentrywatch-core::AlertSink over a bearer-authenticated
// HTTP POST.
// Dependencies: sentrywatch-core, reqwest
// ============================================================================

//! ## Overview
//! [`HttpAlertSink`] posts a batch of [`Alert`] rows to a single endpoint
//! addressed by rule id and stream name, mirroring the single-call-per-run
//! upload contract the orchestrator expects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Url;

use sentrywatch_core::Alert;
use sentrywatch_core::AlertSink;
use sentrywatch_core::SinkError;

use crate::auth::TokenCache;
use crate::auth::TokenProvider;
use crate::http_client::BoundedHttpClient;

// ============================================================================
// SECTION: HTTP Alert Sink
// ============================================================================

/// [`AlertSink`] that uploads a batch of alerts as a single JSON POST.
pub struct HttpAlertSink<P: TokenProvider> {
    /// Bounded transport used for the upload call.
    http: BoundedHttpClient,
    /// Token cache for the sink's own service identity.
    tokens: TokenCache<P>,
    /// Log-ingestion endpoint alert batches are posted to.
    endpoint: Url,
    /// Tenant id tokens are acquired under (the sink's identity, not a
    /// monitored tenant).
    tenant_id: sentrywatch_core::TenantId,
}

impl<P: TokenProvider> HttpAlertSink<P> {
    /// Builds a sink that posts to `endpoint` using tokens acquired for
    /// `tenant_id` (the sink's own service identity, not a monitored
    /// tenant).
    #[must_use]
    pub fn new(http: BoundedHttpClient, tokens: TokenCache<P>, endpoint: Url, tenant_id: sentrywatch_core::TenantId) -> Self {
        Self { http, tokens, endpoint, tenant_id }
    }
}

#[async_trait]
impl<P: TokenProvider + Send + Sync> AlertSink for HttpAlertSink<P> {
    async fn upload(&self, rule_id: &str, stream_name: &str, rows: &[Alert]) -> Result<(), SinkError> {
        if rows.is_empty() {
            return Ok(());
        }
        let now = time::OffsetDateTime::now_utc();
        let token = self
            .tokens
            .token_for(&self.tenant_id, now)
            .await
            .map_err(|err| SinkError::UploadFailed(err.to_string()))?;

        let body = serde_json::json!({
            "ruleId": rule_id,
            "streamName": stream_name,
            "rows": rows,
        });

        let status = self
            .http
            .post_json(&self.endpoint, Some(&token), &body)
            .await
            .map_err(|err| SinkError::UploadFailed(err.to_string()))?;

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(SinkError::UploadFailed(format!("sink endpoint returned status {status}")))
        }
    }
}
