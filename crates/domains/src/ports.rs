//! # Ports
//!
//! Contracts the services depend on. Adapter crates implement them;
//! the binaries pick which implementation gets wired in.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::errors::Result;
use crate::models::{CachedPost, RemoteSearchPage, RemoteSearchRequest};

/// Client-local durable key-value storage holding string documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Wall-clock source, in milliseconds since the Unix epoch.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Produces opaque identifiers for new guest sessions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Server-side forum search.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RemoteSearch: Send + Sync {
    /// `GET /search`. A 401 must surface as `DomainError::Unauthorized`.
    async fn search(
        &self,
        request: &RemoteSearchRequest,
        token: Option<SecretString>,
    ) -> Result<RemoteSearchPage>;

    /// `GET /search/suggestions`.
    async fn suggestions(&self, query: &str, token: Option<SecretString>) -> Result<Vec<String>>;
}

/// Read access to the forum-post cache owned by the client UI layer.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostCache: Send + Sync {
    async fn cached_posts(&self) -> Result<Vec<CachedPost>>;
}

/// Supplies the bearer token of the signed-in user, if any.
///
/// A missing token is not an error: requests go out unauthenticated.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<SecretString>;
}
