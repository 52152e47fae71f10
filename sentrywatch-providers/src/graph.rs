// sentrywatch-providers/src/graph.rs
// ============================================================================
// Module: Graph-Style Upstream Clients
// Description: SignIn/SecurityAlert/AuditLog clients over a paginated REST API.
// Purpose: Implement sentrywatch-core's three upstream fetch traits against
// a Graph-shaped log endpoint (`value` + `@odata.nextLink` pagination).
// Dependencies: sentrywatch-core, reqwest, time, tracing
// ============================================================================

//! ## Overview
//! All three upstream sources share one wire shape: a JSON object with a
//! `value` array of events and an optional `@odata.nextLink` for
//! pagination. [`GraphClient`] implements the paginated fetch and the
//! response-status-to-[`ClientError`] classification once; the three
//! trait impls below each just supply their endpoint template.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use sentrywatch_core::AuditLogClient;
use sentrywatch_core::ClientError;
use sentrywatch_core::EventTree;
use sentrywatch_core::SecurityAlertClient;
use sentrywatch_core::SignInClient;
use sentrywatch_core::TenantId;

use crate::auth::TokenCache;
use crate::auth::TokenProvider;
use crate::http_client::BoundedHttpClient;

/// Hard ceiling on pages followed per `fetch_since` call, guarding against
/// a misbehaving upstream handing back an unbounded `nextLink` chain.
const MAX_PAGES: usize = 50;

// ============================================================================
// SECTION: Shared Fetch Helper
// ============================================================================

/// Upstream source reached through the shared Graph-style pagination and
/// error-classification logic.
pub struct GraphClient<P: TokenProvider> {
    /// Bounded transport shared with every fetch call.
    http: BoundedHttpClient,
    /// Per-tenant bearer token cache, shared across every source wired
    /// against this Graph endpoint so sign-in, security-alert, and
    /// audit-log fetches for the same tenant reuse one cached token.
    tokens: Arc<TokenCache<P>>,
    /// Root URL every endpoint path is resolved against.
    base_url: Url,
}

impl<P: TokenProvider> GraphClient<P> {
    /// Builds a client rooted at `base_url`, using `http` for transport and
    /// `tokens` for per-tenant bearer acquisition.
    #[must_use]
    pub fn new(http: BoundedHttpClient, tokens: Arc<TokenCache<P>>, base_url: Url) -> Self {
        Self { http, tokens, base_url }
    }

    /// Fetches every event page for `path_suffix` whose timestamp filter is
    /// `filter_query`, following `@odata.nextLink` up to [`MAX_PAGES`].
    async fn fetch_paginated(
        &self,
        tenant_id: &TenantId,
        path_suffix: &str,
        filter_query: &str,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError> {
        let token = self
            .tokens
            .token_for(tenant_id, now)
            .await
            .map_err(|err| ClientError::Other(err.to_string()))?;

        let mut url = self
            .base_url
            .join(path_suffix)
            .map_err(|err| ClientError::Other(err.to_string()))?;
        url.set_query(Some(filter_query));

        let mut events = Vec::new();
        let mut next_url = Some(url);
        let mut pages = 0;

        while let Some(current) = next_url {
            if pages >= MAX_PAGES {
                tracing::warn!(tenant = %tenant_id, pages, "stopped following nextLink: page cap reached");
                break;
            }
            pages += 1;

            let (status, body) = self
                .http
                .get_json(&current, Some(&token))
                .await
                .map_err(|err| ClientError::Other(err.to_string()))?;
            classify_status(status, &body)?;

            if let Some(page) = body.get("value").and_then(|value| value.as_array()) {
                events.extend(page.iter().cloned());
            }
            next_url = body
                .get("@odata.nextLink")
                .and_then(|link| link.as_str())
                .and_then(|link| Url::parse(link).ok());
        }

        Ok(events)
    }
}

/// Maps an HTTP status (and, where useful, the error body) onto
/// [`ClientError`]. 2xx is success; non-2xx is classified per the
/// documented authentication/authorization taxonomy.
fn classify_status(status: u16, body: &serde_json::Value) -> Result<(), ClientError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let message = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
        .unwrap_or("no error detail provided")
        .to_string();
    match status {
        401 => Err(ClientError::AppNotConsented(message)),
        403 => Err(ClientError::PermissionDenied(message)),
        404 => Err(ClientError::TenantNotFound(message)),
        408 | 504 => Err(ClientError::Timeout(message)),
        _ => Err(ClientError::Other(format!("status {status}: {message}"))),
    }
}

/// Renders the half-open window `[since, now)` as an OData `$filter` query
/// string keyed on `field`.
fn window_filter(field: &str, since: OffsetDateTime, now: OffsetDateTime) -> Result<String, ClientError> {
    let since_text = since.format(&Rfc3339).map_err(|err| ClientError::Other(err.to_string()))?;
    let now_text = now.format(&Rfc3339).map_err(|err| ClientError::Other(err.to_string()))?;
    Ok(format!("$filter={field} ge {since_text} and {field} lt {now_text}"))
}

// ============================================================================
// SECTION: Sign-In Client
// ============================================================================

/// [`SignInClient`] backed by a [`GraphClient`].
pub struct HttpSignInClient<P: TokenProvider> {
    /// Shared paginated-fetch and auth plumbing.
    graph: GraphClient<P>,
}

impl<P: TokenProvider> HttpSignInClient<P> {
    /// Wraps `graph` as a [`SignInClient`].
    #[must_use]
    pub fn new(graph: GraphClient<P>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl<P: TokenProvider + Send + Sync> SignInClient for HttpSignInClient<P> {
    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError> {
        let filter = window_filter("createdDateTime", since, now)?;
        self.graph.fetch_paginated(tenant_id, "auditLogs/signIns", &filter, now).await
    }
}

// ============================================================================
// SECTION: Security-Alert Client
// ============================================================================

/// [`SecurityAlertClient`] backed by a [`GraphClient`].
pub struct HttpSecurityAlertClient<P: TokenProvider> {
    /// Shared paginated-fetch and auth plumbing.
    graph: GraphClient<P>,
}

impl<P: TokenProvider> HttpSecurityAlertClient<P> {
    /// Wraps `graph` as a [`SecurityAlertClient`].
    #[must_use]
    pub fn new(graph: GraphClient<P>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl<P: TokenProvider + Send + Sync> SecurityAlertClient for HttpSecurityAlertClient<P> {
    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError> {
        let filter = window_filter("createdDateTime", since, now)?;
        self.graph.fetch_paginated(tenant_id, "security/alerts_v2", &filter, now).await
    }
}

// ============================================================================
// SECTION: Audit-Log Client
// ============================================================================

/// [`AuditLogClient`] backed by a [`GraphClient`].
pub struct HttpAuditLogClient<P: TokenProvider> {
    /// Shared paginated-fetch and auth plumbing.
    graph: GraphClient<P>,
}

impl<P: TokenProvider> HttpAuditLogClient<P> {
    /// Wraps `graph` as an [`AuditLogClient`].
    #[must_use]
    pub fn new(graph: GraphClient<P>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl<P: TokenProvider + Send + Sync> AuditLogClient for HttpAuditLogClient<P> {
    async fn ensure_subscription(&self, tenant_id: &TenantId) -> Result<(), ClientError> {
        let now = OffsetDateTime::now_utc();
        let token = self
            .graph
            .tokens
            .token_for(tenant_id, now)
            .await
            .map_err(|err| ClientError::Other(err.to_string()))?;
        let url = self
            .graph
            .base_url
            .join("auditLogs/management/subscriptions")
            .map_err(|err| ClientError::Other(err.to_string()))?;
        let body = serde_json::json!({ "contentType": "Audit.General" });
        let status = self
            .graph
            .http
            .post_json(&url, Some(&token), &body)
            .await
            .map_err(|err| ClientError::Other(err.to_string()))?;
        match status {
            200..=299 => Ok(()),
            404 => Err(ClientError::AuditLogDisabled(format!("status {status}"))),
            _ => classify_status(status, &serde_json::Value::Null),
        }
    }

    async fn fetch_since(
        &self,
        tenant_id: &TenantId,
        since: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Vec<EventTree>, ClientError> {
        let filter = window_filter("CreationTime", since, now)?;
        self.graph.fetch_paginated(tenant_id, "audit/management/activityfeed", &filter, now).await
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::classify_status;

    #[test]
    fn maps_401_to_app_not_consented() {
        let body = json!({ "error": { "message": "consent required" } });
        let err = classify_status(401, &body).expect_err("401 must classify as an error");
        assert!(matches!(err, sentrywatch_core::ClientError::AppNotConsented(_)));
    }

    #[test]
    fn maps_404_to_tenant_not_found() {
        let err = classify_status(404, &serde_json::Value::Null).expect_err("404 must classify as an error");
        assert!(matches!(err, sentrywatch_core::ClientError::TenantNotFound(_)));
    }

    #[test]
    fn maps_403_to_permission_denied() {
        let err = classify_status(403, &serde_json::Value::Null).expect_err("403 must classify as an error");
        assert!(matches!(err, sentrywatch_core::ClientError::PermissionDenied(_)));
    }

    #[test]
    fn accepts_2xx_statuses() {
        assert!(classify_status(200, &serde_json::Value::Null).is_ok());
        assert!(classify_status(204, &serde_json::Value::Null).is_ok());
    }
}
