// sentrywatch-providers/src/webhook.rs
// ============================================================================
// Module: HTTP Webhook Notifier Transport
// Description: Posts a rendered card payload to a chat webhook URL.
// Purpose: Implement sentrywatch-core::NotifierTransport over a plain HTTPS
// POST (no bearer token: webhook URLs are themselves the credential).
// Dependencies: sentrywatch-core, reqwest
// ============================================================================

//! ## Overview
//! Chat webhooks authenticate by the secrecy of their URL, not a bearer
//! token, so [`HttpWebhookTransport`] posts the card payload directly
//! through the shared [`BoundedHttpClient`] without going through the
//! token cache.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Url;

use sentrywatch_core::NotifierTransport;
use sentrywatch_core::NotifierTransportError;

use crate::http_client::BoundedHttpClient;

// ============================================================================
// SECTION: HTTP Webhook Transport
// ============================================================================

/// [`NotifierTransport`] that posts a card payload to a webhook URL.
pub struct HttpWebhookTransport {
    /// Bounded transport used for the webhook POST.
    http: BoundedHttpClient,
}

impl HttpWebhookTransport {
    /// Wraps `http` as a [`NotifierTransport`].
    #[must_use]
    pub fn new(http: BoundedHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotifierTransport for HttpWebhookTransport {
    async fn post_card(&self, webhook_url: &str, payload: &serde_json::Value) -> Result<(), NotifierTransportError> {
        let url = Url::parse(webhook_url).map_err(|err| NotifierTransportError::PostFailed(err.to_string()))?;
        let status = self
            .http
            .post_json(&url, None, payload)
            .await
            .map_err(|err| NotifierTransportError::PostFailed(err.to_string()))?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(NotifierTransportError::PostFailed(format!("webhook returned status {status}")))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use serde_json::json;

    use super::HttpWebhookTransport;
    use crate::http_client::BoundedHttpClient;
    use crate::http_client::HttpClientConfig;
    use sentrywatch_core::NotifierTransport;

    fn spawn_server(status: u16) -> (String, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
        let addr = server.server_addr();
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            ready_tx.send(()).expect("signal ready");
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::empty(status);
                let _ = request.respond(response);
            }
        });
        ready_rx.recv().expect("server ready");
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn posts_card_and_treats_2xx_as_success() {
        let (url, handle) = spawn_server(200);
        let config = HttpClientConfig { allow_http: true, ..HttpClientConfig::default() };
        let http = BoundedHttpClient::new(config).expect("client builds");
        let transport = HttpWebhookTransport::new(http);

        let result = transport.post_card(&url, &json!({ "text": "alert" })).await;
        assert!(result.is_ok());
        handle.join().expect("server thread joins");
    }

    #[tokio::test]
    async fn non_2xx_status_is_reported_as_post_failed() {
        let (url, handle) = spawn_server(500);
        let config = HttpClientConfig { allow_http: true, ..HttpClientConfig::default() };
        let http = BoundedHttpClient::new(config).expect("client builds");
        let transport = HttpWebhookTransport::new(http);

        let result = transport.post_card(&url, &json!({ "text": "alert" })).await;
        assert!(result.is_err());
        handle.join().expect("server thread joins");
    }
}
