// sentrywatch-cli/src/token_provider.rs
// ============================================================================
// Module: Client-Credentials Token Provider
// Description: Concrete OAuth2 client-credentials TokenProvider.
// Purpose: Supply sentrywatch-providers::TokenCache with real bearer tokens,
// acquired either from a client secret or a federation assertion file.
// Dependencies: sentrywatch-config, sentrywatch-providers, reqwest, time
// ============================================================================

//! ## Overview
//! `sentrywatch-providers::auth` deliberately stops at the [`TokenProvider`]
//! trait and leaves credential acquisition mechanics to the binary that
//! knows which identity platform it's talking to. This module is that
//! binary-level mechanics: a client-credentials grant against a per-tenant
//! token endpoint, using either a client secret or a federation assertion
//! file re-read on every acquisition (never cached in memory, so a rotated
//! assertion file takes effect on the next refresh without a restart).

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Url;
use time::Duration;
use time::OffsetDateTime;

use sentrywatch_config::Credential;
use sentrywatch_core::TenantId;
use sentrywatch_providers::BoundedHttpClient;
use sentrywatch_providers::TokenError;
use sentrywatch_providers::TokenProvider;

/// Assumed token lifetime when the token endpoint's response omits
/// `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

// ============================================================================
// SECTION: Client-Credentials Provider
// ============================================================================

/// Acquires bearer tokens via an OAuth2 client-credentials grant.
///
/// `token_endpoint_template` may contain a `{tenant_id}` placeholder, filled
/// in per call with the tenant the token is being requested for — the
/// multi-tenant shape this engine authenticates against issues one token
/// endpoint per customer directory rather than one shared endpoint.
#[derive(Clone)]
pub struct ClientCredentialsTokenProvider {
    http: BoundedHttpClient,
    token_endpoint_template: String,
    client_id: String,
    credential: Credential,
    scope: String,
}

impl ClientCredentialsTokenProvider {
    /// Builds a provider that requests `scope` from the endpoint produced by
    /// substituting a tenant id into `token_endpoint_template`.
    #[must_use]
    pub fn new(
        http: BoundedHttpClient,
        token_endpoint_template: String,
        client_id: String,
        credential: Credential,
        scope: String,
    ) -> Self {
        Self { http, token_endpoint_template, client_id, credential, scope }
    }

    fn token_endpoint(&self, tenant_id: &TenantId) -> Result<Url, TokenError> {
        let resolved = self.token_endpoint_template.replace("{tenant_id}", tenant_id.as_str());
        Url::parse(&resolved).map_err(|err| TokenError::Acquisition(format!("invalid token endpoint: {err}")))
    }
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn acquire(&self, tenant_id: &TenantId) -> Result<(String, OffsetDateTime), TokenError> {
        let endpoint = self.token_endpoint(tenant_id)?;

        let assertion;
        let mut form: Vec<(&str, &str)> =
            vec![("grant_type", "client_credentials"), ("client_id", &self.client_id), ("scope", &self.scope)];
        match &self.credential {
            Credential::ClientSecret(secret) => form.push(("client_secret", secret.as_str())),
            Credential::FederationAssertion(path) => {
                assertion = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|err| TokenError::Acquisition(format!("failed to read federation assertion: {err}")))?;
                form.push(("client_assertion_type", "urn:ietf:params:oauth:client-assertion-type:jwt-bearer"));
                form.push(("client_assertion", assertion.trim()));
            }
        }

        let body = self.http.post_form(&endpoint, &form).await.map_err(|err| TokenError::Acquisition(err.to_string()))?;

        let access_token = body
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| TokenError::Acquisition("token response missing access_token".to_string()))?
            .to_string();
        let expires_in = body.get("expires_in").and_then(serde_json::Value::as_i64).unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok((access_token, OffsetDateTime::now_utc() + Duration::seconds(expires_in)))
    }
}
