// sentrywatch-providers/tests/graph_client.rs
// ============================================================================
// Module: Graph Client Integration Tests
// Description: Exercises HttpSignInClient against an in-process HTTP server.
// Purpose: Verify pagination following and upstream error classification.
// Dependencies: tiny_http, tokio
// ============================================================================

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "integration test assertions")]

mod common;

use reqwest::Url;
use time::Duration;
use time::OffsetDateTime;

use sentrywatch_core::ClientError;
use sentrywatch_core::SignInClient;
use sentrywatch_core::TenantId;
use sentrywatch_providers::BoundedHttpClient;
use sentrywatch_providers::GraphClient;
use sentrywatch_providers::HttpClientConfig;
use sentrywatch_providers::HttpSignInClient;
use sentrywatch_providers::TokenCache;

use common::StaticTokenProvider;
use common::bind_server;
use common::serve;
use common::spawn_server;

fn client_for(base_url: &str) -> HttpSignInClient<StaticTokenProvider> {
    let config = HttpClientConfig { allow_http: true, ..HttpClientConfig::default() };
    let http = BoundedHttpClient::new(config).expect("client builds");
    let tokens = TokenCache::new(StaticTokenProvider);
    let base = Url::parse(base_url).expect("valid base url");
    HttpSignInClient::new(GraphClient::new(http, tokens, base))
}

#[tokio::test]
async fn follows_next_link_pagination_across_pages() {
    let (server, base_url) = bind_server();

    let second_page = serde_json::json!({
        "value": [{"id": "2", "createdDateTime": "2026-01-01T00:01:00Z"}],
    });
    let first_page = serde_json::json!({
        "value": [{"id": "1", "createdDateTime": "2026-01-01T00:00:00Z"}],
        "@odata.nextLink": format!("{base_url}page2"),
    });

    let handle = serve(server, vec![(200, first_page.to_string()), (200, second_page.to_string())]);

    let client = client_for(&base_url);
    let tenant = TenantId::from("tenant-a");
    let since = OffsetDateTime::now_utc() - Duration::hours(1);
    let now = OffsetDateTime::now_utc();

    let events = client.fetch_since(&tenant, since, now).await.expect("fetch succeeds");
    assert_eq!(events.len(), 2);
    handle.join().expect("server thread joins");
}

#[tokio::test]
async fn classifies_401_as_app_not_consented() {
    let body = serde_json::json!({ "error": { "message": "consent required" } });
    let (base_url, handle) = spawn_server(vec![(401, body.to_string())]);

    let client = client_for(&base_url);
    let tenant = TenantId::from("tenant-a");
    let since = OffsetDateTime::now_utc() - Duration::hours(1);
    let now = OffsetDateTime::now_utc();

    let result = client.fetch_since(&tenant, since, now).await;
    assert!(matches!(result, Err(ClientError::AppNotConsented(_))));
    handle.join().expect("server thread joins");
}

#[tokio::test]
async fn empty_value_array_yields_no_events() {
    let body = serde_json::json!({ "value": [] });
    let (base_url, handle) = spawn_server(vec![(200, body.to_string())]);

    let client = client_for(&base_url);
    let tenant = TenantId::from("tenant-a");
    let since = OffsetDateTime::now_utc() - Duration::hours(1);
    let now = OffsetDateTime::now_utc();

    let events = client.fetch_since(&tenant, since, now).await.expect("fetch succeeds");
    assert!(events.is_empty());
    handle.join().expect("server thread joins");
}
