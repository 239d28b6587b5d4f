//! # auth-adapters
//!
//! Sources of the bearer token attached to remote search requests.
//! A missing token is never an error: search then goes out anonymously.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{Clock, KeyValueStore, TokenProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_AUTH_SESSION_KEY: &str = "auth_session";

/// Token fixed at startup, usually from configuration.
pub struct StaticTokenProvider {
    token: Option<SecretString>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<SecretString>) -> Self {
        // blank tokens would send "Authorization: Bearer "
        let token = token.filter(|t| !t.expose_secret().trim().is_empty());
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Option<SecretString> {
        self.token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }
}

/// Persisted auth session written by the sign-in flow.
#[derive(Deserialize)]
struct StoredAuthSession {
    access_token: Option<String>,
    /// Seconds since the Unix epoch
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Reads the signed-in user's token from the key-value store on every call,
/// so sign-in and sign-out take effect without a restart.
pub struct StoredTokenProvider {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
}

impl StoredTokenProvider {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, key: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            key: key.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn access_token(&self) -> Option<SecretString> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read auth session");
                return None;
            }
        };

        let session: StoredAuthSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring malformed auth session");
                return None;
            }
        };

        if let Some(expires_at) = session.expires_at {
            if expires_at.saturating_mul(1000) <= self.clock.now_ms() {
                debug!(key = %self.key, "stored access token has expired");
                return None;
            }
        }

        session
            .access_token
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{DomainError, MockClock, MockKeyValueStore};
    use storage_adapters::MemoryKvStore;

    fn clock_at(ms: i64) -> Arc<MockClock> {
        let mut clock = MockClock::new();
        clock.expect_now_ms().return_const(ms);
        Arc::new(clock)
    }

    async fn token_from(json: &str, now_ms: i64) -> Option<String> {
        let store = Arc::new(MemoryKvStore::new());
        store.set(DEFAULT_AUTH_SESSION_KEY, json).await.unwrap();
        StoredTokenProvider::new(store, clock_at(now_ms), DEFAULT_AUTH_SESSION_KEY)
            .access_token()
            .await
            .map(|t| t.expose_secret().to_owned())
    }

    #[tokio::test]
    async fn static_token_is_handed_out_each_time() {
        let provider = StaticTokenProvider::new(Some(SecretString::from("jwt".to_string())));
        assert_eq!(provider.access_token().await.unwrap().expose_secret(), "jwt");
        assert_eq!(provider.access_token().await.unwrap().expose_secret(), "jwt");

        let blank = StaticTokenProvider::new(Some(SecretString::from("  ".to_string())));
        assert!(blank.access_token().await.is_none());
        assert!(StaticTokenProvider::anonymous().access_token().await.is_none());
    }

    #[tokio::test]
    async fn stored_token_respects_expiry() {
        let json = r#"{"access_token": "abc", "expires_at": 1700000000}"#;
        assert_eq!(token_from(json, 1_699_999_999_000).await.as_deref(), Some("abc"));
        assert_eq!(token_from(json, 1_700_000_000_000).await, None);

        let no_expiry = r#"{"access_token": "abc", "refresh_token": "r"}"#;
        assert_eq!(token_from(no_expiry, i64::MAX).await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn unusable_sessions_mean_anonymous() {
        assert_eq!(token_from("not json", 0).await, None);
        assert_eq!(token_from(r#"{"access_token": ""}"#, 0).await, None);
        assert_eq!(token_from(r#"{"user": {}}"#, 0).await, None);

        let provider = StoredTokenProvider::new(
            Arc::new(MemoryKvStore::new()),
            clock_at(0),
            DEFAULT_AUTH_SESSION_KEY,
        );
        assert!(provider.access_token().await.is_none());
    }

    #[tokio::test]
    async fn storage_failure_means_anonymous() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(DomainError::storage("disk gone")));
        let provider = StoredTokenProvider::new(Arc::new(store), clock_at(0), "auth");

        assert!(provider.access_token().await.is_none());
    }
}
