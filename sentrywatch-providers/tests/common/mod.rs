// sentrywatch-providers/tests/common/mod.rs
// ============================================================================
// Module: Provider Test Fixtures
// Description: Shared in-process HTTP server and fake token provider helpers.
// Purpose: Give every provider integration test the same server-spawn pattern.
// Dependencies: tiny_http
// ============================================================================

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test fixtures")]

use std::sync::mpsc;
use std::thread;

use time::Duration;
use time::OffsetDateTime;

use sentrywatch_providers::TokenError;
use sentrywatch_providers::TokenProvider;

/// Binds a `tiny_http` server to an OS-assigned port without serving yet,
/// returning it alongside its base URL so callers can embed that URL in the
/// response bodies they are about to queue (e.g. an `@odata.nextLink`
/// pointing back at the same server).
pub fn bind_server() -> (tiny_http::Server, String) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr();
    (server, format!("http://{addr}/"))
}

/// Serves each queued `(status, body)` pair, in order, on a background
/// thread.
pub fn serve(server: tiny_http::Server, responses: Vec<(u16, String)>) -> thread::JoinHandle<()> {
    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        ready_tx.send(()).expect("signal ready");
        for (status, body) in responses {
            if let Ok(request) = server.recv() {
                let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("valid header");
                let response = tiny_http::Response::from_string(body).with_status_code(status).with_header(header);
                let _ = request.respond(response);
            }
        }
    });
    ready_rx.recv().expect("server ready");
    handle
}

/// Spawns a `tiny_http` server on a background thread bound to an
/// OS-assigned port, serving each queued `(status, body)` pair in order.
pub fn spawn_server(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<()>) {
    let (server, url) = bind_server();
    let handle = serve(server, responses);
    (url, handle)
}

/// A [`TokenProvider`] that always returns the same token, valid for an hour.
pub struct StaticTokenProvider;

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire(&self, _tenant_id: &sentrywatch_core::TenantId) -> Result<(String, OffsetDateTime), TokenError> {
        Ok(("test-token".to_string(), OffsetDateTime::now_utc() + Duration::hours(1)))
    }
}
