// sentrywatch-providers/src/http_client.rs
// ============================================================================
// Module: Bounded HTTP Client
// Description: Shared async HTTP client with scheme, host, and size limits.
// Purpose: Give every upstream/sink/webhook adapter the same fail-closed HTTP
// posture instead of each constructing its own reqwest client ad hoc.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! Every concrete adapter in this crate (the three upstream fetch clients,
//! the sink adapter, the webhook transport) issues requests through a
//! [`BoundedHttpClient`] built from the same [`HttpClientConfig`]: HTTPS
//! required unless explicitly relaxed, an optional host allowlist, a
//! request timeout, and a response-size cap enforced by content length.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::Client;
use reqwest::Url;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration shared by every HTTP-backed adapter in this crate.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Allow cleartext HTTP (disabled by default; only ever useful in tests).
    pub allow_http: bool,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum accepted response body size, in bytes.
    pub max_response_bytes: u64,
    /// Optional host allowlist; `None` permits any host the scheme allows.
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string sent with every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            timeout: Duration::from_secs(20),
            max_response_bytes: 8 * 1024 * 1024,
            allowed_hosts: None,
            user_agent: "sentrywatch/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures building or using a [`BoundedHttpClient`].
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The underlying `reqwest` client could not be constructed.
    #[error("failed to build http client: {0}")]
    Build(String),
    /// The request URL uses a disallowed scheme (non-HTTPS without opt-in).
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// The request URL's host is not in the configured allowlist.
    #[error("url host not allowed: {0}")]
    HostNotAllowed(String),
    /// The request failed at the transport level.
    #[error("http request failed: {0}")]
    Request(String),
    /// The response declared (or delivered) a body larger than the configured
    /// limit.
    #[error("response exceeds {max_bytes}-byte limit")]
    ResponseTooLarge {
        /// Configured maximum.
        max_bytes: u64,
    },
    /// The response body could not be decoded as JSON.
    #[error("response is not valid json: {0}")]
    InvalidJson(String),
}

// ============================================================================
// SECTION: Bounded HTTP Client
// ============================================================================

/// A `reqwest` client wrapped with this crate's scheme/host/size policy.
#[derive(Clone)]
pub struct BoundedHttpClient {
    /// Scheme/host/size policy applied to every request.
    config: HttpClientConfig,
    /// Underlying transport.
    client: Client,
}

impl BoundedHttpClient {
    /// Builds a bounded client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Build`] when the underlying `reqwest`
    /// client cannot be constructed.
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| HttpClientError::Build(err.to_string()))?;
        Ok(Self { config, client })
    }

    /// Validates `url` against this client's scheme and host policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::UnsupportedScheme`] or
    /// [`HttpClientError::HostNotAllowed`] when the policy rejects the URL.
    pub fn validate_url(&self, url: &Url) -> Result<(), HttpClientError> {
        match url.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            other => return Err(HttpClientError::UnsupportedScheme(other.to_string())),
        }
        if let Some(allowlist) = &self.config.allowed_hosts {
            let host = url.host_str().unwrap_or_default();
            if !allowlist.contains(host) {
                return Err(HttpClientError::HostNotAllowed(host.to_string()));
            }
        }
        Ok(())
    }

    /// Issues a bearer-authenticated `GET` and parses the response as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] on policy rejection, transport failure,
    /// an oversized response, or undecodable JSON. The caller is
    /// responsible for turning non-2xx statuses into domain errors — this
    /// function does not inspect the status code itself.
    pub async fn get_json(
        &self,
        url: &Url,
        bearer_token: Option<&str>,
    ) -> Result<(u16, serde_json::Value), HttpClientError> {
        self.validate_url(url)?;
        let mut request = self.client.get(url.clone());
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|err| HttpClientError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        self.check_content_length(&response)?;
        let bytes = self.read_bounded(response).await?;
        let value = serde_json::from_slice(&bytes).map_err(|err| HttpClientError::InvalidJson(err.to_string()))?;
        Ok((status, value))
    }

    /// Issues a bearer-authenticated JSON `POST`, returning the response status.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] on policy rejection or transport failure.
    pub async fn post_json(
        &self,
        url: &Url,
        bearer_token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<u16, HttpClientError> {
        self.validate_url(url)?;
        let mut request = self.client.post(url.clone()).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|err| HttpClientError::Request(err.to_string()))?;
        Ok(response.status().as_u16())
    }

    /// Issues a bearer-authenticated `POST` with form-encoded `body`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] on policy rejection or transport failure,
    /// or if the response cannot be parsed as JSON.
    pub async fn post_form(
        &self,
        url: &Url,
        body: &[(&str, &str)],
    ) -> Result<serde_json::Value, HttpClientError> {
        self.validate_url(url)?;
        let response = self
            .client
            .post(url.clone())
            .form(body)
            .send()
            .await
            .map_err(|err| HttpClientError::Request(err.to_string()))?;
        self.check_content_length(&response)?;
        let bytes = self.read_bounded(response).await?;
        serde_json::from_slice(&bytes).map_err(|err| HttpClientError::InvalidJson(err.to_string()))
    }

    /// Rejects a response whose declared `Content-Length` already exceeds
    /// the configured limit, before any bytes are read.
    fn check_content_length(&self, response: &reqwest::Response) -> Result<(), HttpClientError> {
        if let Some(len) = response.content_length()
            && len > self.config.max_response_bytes
        {
            return Err(HttpClientError::ResponseTooLarge { max_bytes: self.config.max_response_bytes });
        }
        Ok(())
    }

    /// Reads a response body, failing once more than the configured limit
    /// has actually been received (covers servers that omit or lie about
    /// `Content-Length`).
    async fn read_bounded(&self, response: reqwest::Response) -> Result<Vec<u8>, HttpClientError> {
        let max_bytes = self.config.max_response_bytes;
        let bytes = response.bytes().await.map_err(|err| HttpClientError::Request(err.to_string()))?;
        if bytes.len() as u64 > max_bytes {
            return Err(HttpClientError::ResponseTooLarge { max_bytes });
        }
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use super::BoundedHttpClient;
    use super::HttpClientConfig;

    #[test]
    fn rejects_http_scheme_by_default() {
        let client = BoundedHttpClient::new(HttpClientConfig::default()).expect("client builds");
        let url = reqwest::Url::parse("http://example.com").expect("valid url");
        assert!(client.validate_url(&url).is_err());
    }

    #[test]
    fn accepts_https_by_default() {
        let client = BoundedHttpClient::new(HttpClientConfig::default()).expect("client builds");
        let url = reqwest::Url::parse("https://example.com").expect("valid url");
        assert!(client.validate_url(&url).is_ok());
    }

    #[test]
    fn enforces_host_allowlist() {
        let mut allowed = std::collections::BTreeSet::new();
        allowed.insert("allowed.example.com".to_string());
        let config = HttpClientConfig { allowed_hosts: Some(allowed), ..HttpClientConfig::default() };
        let client = BoundedHttpClient::new(config).expect("client builds");
        let good = reqwest::Url::parse("https://allowed.example.com").expect("valid url");
        let bad = reqwest::Url::parse("https://other.example.com").expect("valid url");
        assert!(client.validate_url(&good).is_ok());
        assert!(client.validate_url(&bad).is_err());
    }
}
