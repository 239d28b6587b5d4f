//! Wires adapters into the services according to `Settings`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use auth_adapters::{StaticTokenProvider, StoredTokenProvider};
use configs::Settings;
use domains::{Clock, KeyValueStore, TokenProvider};
use secrecy::{ExposeSecret, SecretString};
use services::{ForumSearchFallback, GuestSessionConfig, GuestSessionManager, SearchConfig};
use storage_adapters::{FileKvStore, SystemClock, UuidSessionIdGenerator};
use tracing::info;

pub struct App {
    pub sessions: GuestSessionManager,
    pub search: Arc<ForumSearchFallback>,
    /// Quiet period before a `live` query runs
    pub debounce: Duration,
}

impl App {
    pub fn build(settings: &Settings) -> Result<Self> {
        // 1. Storage and time
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(&settings.storage.path));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 2. Guest quota
        let sessions = GuestSessionManager::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::new(UuidSessionIdGenerator),
            GuestSessionConfig {
                prompt_limit: settings.session.prompt_limit,
                ttl: settings.session.ttl(),
                storage_key: settings.session.storage_key.clone(),
            },
        );

        // 3. Bearer token: a configured one wins over the stored sign-in
        let tokens: Arc<dyn TokenProvider> = match &settings.auth.access_token {
            Some(token) => Arc::new(StaticTokenProvider::new(Some(SecretString::from(
                token.expose_secret().to_owned(),
            )))),
            None => Arc::new(StoredTokenProvider::new(
                Arc::clone(&store),
                clock,
                settings.auth.session_key.clone(),
            )),
        };

        // 4. Search, with the remote API when one is configured
        let search = ForumSearchFallback::new(
            store,
            SearchConfig {
                default_limit: settings.search.default_limit,
                cache_key: settings.search.cache_key.clone(),
            },
        )
        .with_tokens(tokens);
        let search = with_remote(search, settings)?;

        info!(store = %settings.storage.path, "lexassist ready");
        Ok(Self {
            sessions,
            search: Arc::new(search),
            debounce: settings.search.debounce(),
        })
    }
}

#[cfg(feature = "remote-search")]
fn with_remote(search: ForumSearchFallback, settings: &Settings) -> Result<ForumSearchFallback> {
    match &settings.search.base_url {
        Some(base_url) => {
            let remote = api_adapters::HttpRemoteSearch::new(base_url, settings.search.request_timeout())?;
            info!(base_url = %remote.base_url(), "remote search enabled");
            Ok(search.with_remote(Arc::new(remote)))
        }
        None => Ok(search),
    }
}

#[cfg(not(feature = "remote-search"))]
fn with_remote(search: ForumSearchFallback, settings: &Settings) -> Result<ForumSearchFallback> {
    if settings.search.base_url.is_some() {
        tracing::warn!("search.base_url is set but this build has no remote search");
    }
    Ok(search)
}
