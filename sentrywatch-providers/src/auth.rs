// sentrywatch-providers/src/auth.rs
// ============================================================================
// Module: Tenant Token Cache
// Description: Caches per-tenant OAuth2 client-credentials bearer tokens.
// Purpose: Avoid a token round trip on every upstream call while keeping
// credential acquisition itself out of scope.
// Dependencies: sentrywatch-config, time, tokio::sync
// ============================================================================

//! ## Overview
//! Credential acquisition mechanics (certificate handling, federated
//! identity exchange) are deliberately out of scope for this crate; what
//! matters operationally is that a token, once minted for a tenant, is
//! reused until it is close to expiry instead of being re-requested on
//! every poll. [`TokenCache`] holds one process-wide cache keyed by
//! tenant id, refreshing through an injected [`TokenProvider`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use sentrywatch_core::TenantId;

/// Tokens are refreshed this far ahead of their reported expiry.
const REFRESH_SKEW: Duration = Duration::seconds(120);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures acquiring a bearer token for a tenant.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token endpoint rejected the request or returned an error body.
    #[error("token acquisition failed: {0}")]
    Acquisition(String),
}

// ============================================================================
// SECTION: Token Provider
// ============================================================================

/// A source of fresh bearer tokens for a tenant, decoupled from caching.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Acquires a fresh bearer token and its expiry for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the upstream token endpoint rejects the
    /// request.
    async fn acquire(&self, tenant_id: &TenantId) -> Result<(String, OffsetDateTime), TokenError>;
}

// ============================================================================
// SECTION: Token Cache
// ============================================================================

/// A cached bearer token and the instant it stops being safe to reuse.
#[derive(Clone)]
struct CachedToken {
    /// The bearer token value.
    token: String,
    /// When this token's validity ends, per the issuing provider.
    expires_at: OffsetDateTime,
}

/// Process-wide cache of per-tenant bearer tokens, refreshed lazily on read.
pub struct TokenCache<P: TokenProvider> {
    /// Backing source of fresh tokens.
    provider: P,
    /// Cached token per tenant, guarded for concurrent access.
    entries: Mutex<HashMap<TenantId, CachedToken>>,
}

impl<P: TokenProvider> TokenCache<P> {
    /// Builds an empty cache backed by `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns a valid bearer token for `tenant_id`, refreshing it through
    /// the backing [`TokenProvider`] when absent or within the refresh skew
    /// of expiry.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when a refresh is required and the backing
    /// provider fails.
    pub async fn token_for(&self, tenant_id: &TenantId, now: OffsetDateTime) -> Result<String, TokenError> {
        let mut entries = self.entries.lock().await;
        if let Some(cached) = entries.get(tenant_id)
            && cached.expires_at - now > REFRESH_SKEW
        {
            return Ok(cached.token.clone());
        }
        let (token, expires_at) = self.provider.acquire(tenant_id).await?;
        entries.insert(tenant_id.clone(), CachedToken { token: token.clone(), expires_at });
        Ok(token)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use time::Duration as TimeDuration;
    use time::OffsetDateTime;

    use super::TokenCache;
    use super::TokenError;
    use super::TokenProvider;
    use sentrywatch_core::TenantId;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TokenProvider for CountingProvider {
        async fn acquire(&self, _tenant_id: &TenantId) -> Result<(String, OffsetDateTime), TokenError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((format!("token-{call}"), OffsetDateTime::now_utc() + TimeDuration::hours(1)))
        }
    }

    #[tokio::test]
    async fn reuses_cached_token_until_near_expiry() {
        let cache = TokenCache::new(CountingProvider { calls: AtomicUsize::new(0) });
        let tenant = TenantId::from("tenant-a");
        let now = OffsetDateTime::now_utc();

        let first = cache.token_for(&tenant, now).await.expect("acquires token");
        let second = cache.token_for(&tenant, now).await.expect("reuses token");
        assert_eq!(first, second);
        assert_eq!(cache.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_once_past_the_skew_window() {
        let cache = TokenCache::new(CountingProvider { calls: AtomicUsize::new(0) });
        let tenant = TenantId::from("tenant-a");
        let now = OffsetDateTime::now_utc();

        let first = cache.token_for(&tenant, now).await.expect("acquires token");
        let later = now + TimeDuration::hours(1);
        let second = cache.token_for(&tenant, later).await.expect("refreshes token");
        assert_ne!(first, second);
        assert_eq!(cache.provider.calls.load(Ordering::SeqCst), 2);
    }
}
