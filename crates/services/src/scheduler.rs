//! # Search Scheduler
//!
//! Debounces search-as-you-type input. Every `submit` supersedes the one
//! before it: the earlier debounce task is aborted (dropping its in-flight
//! remote request with it) and only the newest generation may publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use domains::{SearchOptions, SearchResponse};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::search::ForumSearchFallback;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A response tagged with the submission that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledResult {
    pub generation: u64,
    pub response: SearchResponse,
}

pub struct SearchScheduler {
    search: Arc<ForumSearchFallback>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    /// Pending debounce task. The lock also orders generation bumps
    /// against publication.
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    results: Arc<watch::Sender<Option<ScheduledResult>>>,
}

impl SearchScheduler {
    pub fn new(search: Arc<ForumSearchFallback>, debounce: Duration) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            search,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
            results: Arc::new(results),
        }
    }

    /// Schedules a search after the debounce delay and returns its
    /// generation. Must be called from within a tokio runtime.
    pub fn submit(&self, query: impl Into<String>, options: SearchOptions) -> u64 {
        let query = query.into();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let search = Arc::clone(&self.search);
        let latest = Arc::clone(&self.generation);
        let gate = Arc::clone(&self.pending);
        let results = Arc::clone(&self.results);
        let debounce = self.debounce;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let response = search.search(&query, &options).await;

            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            let newest = latest.load(Ordering::SeqCst);
            if newest != generation {
                debug!(generation, newest, query = %query, "dropping stale search response");
                return;
            }
            results.send_replace(Some(ScheduledResult { generation, response }));
        }));

        generation
    }

    /// Drops the pending search, if any, without publishing.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ScheduledResult>> {
        self.results.subscribe()
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Drop for SearchScheduler {
    fn drop(&mut self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = pending {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchConfig;
    use async_trait::async_trait;
    use domains::{CachedPost, MockKeyValueStore, PostCache, SearchSource};
    use std::sync::atomic::AtomicUsize;

    /// Counts reads and optionally stalls like a slow disk.
    struct SlowCache {
        posts: Vec<CachedPost>,
        delay: Duration,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl PostCache for SlowCache {
        async fn cached_posts(&self) -> domains::Result<Vec<CachedPost>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.posts.clone())
        }
    }

    fn scheduler(delay: Duration) -> (SearchScheduler, Arc<SlowCache>) {
        let posts = CachedPost::parse_list(
            r#"[{"id": "1", "body": "unpaid wages since March", "category": "Labor Law"},
                {"id": "2", "body": "landlord kept my deposit", "category": "Civil Law"}]"#,
        )
        .unwrap();
        let cache = Arc::new(SlowCache {
            posts,
            delay,
            reads: AtomicUsize::new(0),
        });
        let search = ForumSearchFallback::new(Arc::new(MockKeyValueStore::new()), SearchConfig::default())
            .with_cache(cache.clone());
        (SearchScheduler::new(Arc::new(search), DEFAULT_DEBOUNCE), cache)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_input_runs_only_the_last_query() {
        let (scheduler, cache) = scheduler(Duration::ZERO);
        let rx = scheduler.subscribe();

        scheduler.submit("w", SearchOptions::default());
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.submit("wa", SearchOptions::default());
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = scheduler.submit("wages", SearchOptions::default());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(cache.reads.load(Ordering::SeqCst), 1);
        let published = rx.borrow().clone().unwrap();
        assert_eq!(published.generation, last);
        assert_eq!(published.response.query, "wages");
        assert_eq!(published.response.source, SearchSource::Cache);
        assert_eq!(published.response.data[0]["id"], "1");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_published_before_the_debounce_elapses() {
        let (scheduler, cache) = scheduler(Duration::ZERO);
        let rx = scheduler.subscribe();

        scheduler.submit("deposit", SearchOptions::default());
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(rx.borrow().is_none());
        assert_eq!(cache.reads.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.borrow().as_ref().map(|r| r.generation), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_in_flight_search_never_publishes() {
        let (scheduler, cache) = scheduler(Duration::from_secs(1));
        let mut rx = scheduler.subscribe();

        scheduler.submit("wages", SearchOptions::default());
        // past the debounce: the first search is now reading the slow cache
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(cache.reads.load(Ordering::SeqCst), 1);

        let second = scheduler.submit("deposit", SearchOptions::default());
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.generation, second);
        assert_eq!(published.response.query, "deposit");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_the_pending_search() {
        let (scheduler, cache) = scheduler(Duration::ZERO);
        let rx = scheduler.subscribe();

        scheduler.submit("wages", SearchOptions::default());
        scheduler.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.borrow().is_none());
        assert_eq!(cache.reads.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.latest_generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_searches_publish_in_order() {
        let (scheduler, _) = scheduler(Duration::ZERO);
        let mut rx = scheduler.subscribe();

        scheduler.submit("wages", SearchOptions::default());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().generation, 1);

        scheduler.submit("#civil", SearchOptions::default());
        rx.changed().await.unwrap();
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.generation, 2);
        assert_eq!(published.response.data[0]["id"], "2");
    }
}
