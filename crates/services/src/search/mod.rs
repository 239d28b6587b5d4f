//! # Forum Search
//!
//! Tries the server's search endpoint first. On a 401, a non-2xx status,
//! a timeout, or a network error it scans the client's cached posts
//! instead, classifying the query by prefix, ranking the hits, and
//! returning them in the server's result shape.
//!
//! Nothing here returns an error: every path ends in a [`SearchResponse`].

mod matcher;
mod ranking;
pub mod suggestions;

use std::sync::Arc;

use domains::{
    found_message, CachedPost, KeyValueStore, PostCache, RemoteSearch, RemoteSearchRequest,
    SearchOptions, SearchQuery, SearchResponse, SearchResult, SearchSource, SortBy, TokenProvider,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use self::matcher::Matcher;

pub const DEFAULT_RESULT_LIMIT: usize = 50;
pub const DEFAULT_CACHE_KEY: &str = "forum_posts_cache";

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search term.";
pub const NO_CACHE_MESSAGE: &str =
    "No cached posts available offline. Connect to the internet to search the forum.";
const UNUSABLE_QUERY_MESSAGE: &str = "This search could not be processed. Try different keywords.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Used when the caller passes no limit (or zero)
    pub default_limit: usize,
    /// Key of the legacy cached-post list in the key-value store
    pub cache_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_RESULT_LIMIT,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

pub struct ForumSearchFallback {
    store: Arc<dyn KeyValueStore>,
    cache: Option<Arc<dyn PostCache>>,
    remote: Option<Arc<dyn RemoteSearch>>,
    tokens: Option<Arc<dyn TokenProvider>>,
    config: SearchConfig,
}

impl ForumSearchFallback {
    /// Offline-only search reading the legacy post list from `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, config: SearchConfig) -> Self {
        Self {
            store,
            cache: None,
            remote: None,
            tokens: None,
            config,
        }
    }

    /// Reads posts from `cache` instead of the legacy stored list.
    pub fn with_cache(mut self, cache: Arc<dyn PostCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteSearch>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Remote search with cache fallback. Never retries the remote call.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> SearchResponse {
        let Some(parsed) = SearchQuery::parse(query) else {
            debug!("rejecting empty search query");
            return SearchResponse::failure(query.trim(), EMPTY_QUERY_MESSAGE);
        };
        let limit = self.effective_limit(options.limit);

        if let Some(remote) = &self.remote {
            let request = RemoteSearchRequest {
                q: parsed.raw.clone(),
                sort: options.sort_by,
                limit,
                category: options.category.clone(),
            };
            match remote.search(&request, self.token().await).await {
                Ok(page) => {
                    debug!(query = %parsed.raw, results = page.data.len(), "remote search succeeded");
                    return SearchResponse::from_remote(parsed.raw, page);
                }
                Err(err) if err.is_remote_unavailable() => {
                    info!(query = %parsed.raw, error = %err, "remote search unavailable; searching cached posts")
                }
                Err(err) => {
                    warn!(query = %parsed.raw, error = %err, "remote search failed; searching cached posts")
                }
            }
        }

        self.fallback(&parsed, options, limit).await
    }

    /// Searches cached posts only, without contacting the server.
    pub async fn search_offline(&self, query: &str, options: &SearchOptions) -> SearchResponse {
        match SearchQuery::parse(query) {
            Some(parsed) => {
                let limit = self.effective_limit(options.limit);
                self.fallback(&parsed, options, limit).await
            }
            None => SearchResponse::failure(query.trim(), EMPTY_QUERY_MESSAGE),
        }
    }

    /// Autocomplete: remote first, then the local tables.
    pub async fn suggestions(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        if let Some(remote) = &self.remote {
            match remote.suggestions(trimmed, self.token().await).await {
                Ok(suggestions) => return suggestions,
                Err(err) => debug!(error = %err, "remote suggestions unavailable; using local table"),
            }
        }

        suggestions::local_suggestions(trimmed)
    }

    async fn fallback(&self, query: &SearchQuery, options: &SearchOptions, limit: usize) -> SearchResponse {
        let posts = self.cached_posts().await;
        if posts.is_empty() {
            info!(query = %query.raw, "no cached posts to search");
            return SearchResponse::empty(query.raw.clone(), NO_CACHE_MESSAGE, SearchSource::None);
        }

        let matcher = match Matcher::build(query, options.category.as_deref()) {
            Ok(matcher) => matcher,
            Err(err) => {
                warn!(query = %query.raw, error = %err, "could not compile search term");
                return SearchResponse::failure(query.raw.clone(), UNUSABLE_QUERY_MESSAGE);
            }
        };

        let hits: Vec<SearchResult> = posts
            .iter()
            .map(CachedPost::to_search_result)
            .filter(|post| matcher.matches(post))
            .collect();

        let mut hits = match options.sort_by {
            SortBy::Relevance => ranking::by_relevance(hits, matcher.ranking_pattern()),
            SortBy::Date => {
                let mut hits = hits;
                ranking::by_date(&mut hits);
                hits
            }
        };
        hits.truncate(limit);

        let message = if hits.is_empty() {
            matcher.no_match_message(query)
        } else {
            found_message(hits.len(), &query.raw)
        };
        info!(
            query = %query.raw,
            mode = ?query.mode,
            scanned = posts.len(),
            results = hits.len(),
            "searched cached posts"
        );

        SearchResponse::from_cache(query.raw.clone(), hits, message)
    }

    async fn cached_posts(&self) -> Vec<CachedPost> {
        match &self.cache {
            Some(cache) => cache.cached_posts().await.unwrap_or_else(|err| {
                warn!(error = %err, "post cache unavailable");
                Vec::new()
            }),
            None => self.stored_posts().await,
        }
    }

    /// Legacy path: the post list serialized under `cache_key`.
    async fn stored_posts(&self) -> Vec<CachedPost> {
        match self.store.get(&self.config.cache_key).await {
            Ok(Some(raw)) => CachedPost::parse_list(&raw).unwrap_or_else(|err| {
                warn!(key = %self.config.cache_key, error = %err, "stored post cache is malformed");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %self.config.cache_key, error = %err, "failed to read stored post cache");
                Vec::new()
            }
        }
    }

    async fn token(&self) -> Option<SecretString> {
        match &self.tokens {
            Some(tokens) => tokens.access_token().await,
            None => None,
        }
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|limit| *limit > 0)
            .unwrap_or(self.config.default_limit)
            .max(1)
    }
}
