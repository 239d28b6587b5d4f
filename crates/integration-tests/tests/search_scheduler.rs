//! Debounced search-as-you-type over a real post cache, on paused time.

use std::sync::Arc;
use std::time::Duration;

use domains::{SearchOptions, SearchSource};
use integration_tests::fixtures::{forum_cache, ids};
use services::{ForumSearchFallback, SearchConfig, SearchScheduler};
use storage_adapters::{MemoryKvStore, MemoryPostCache};

fn scheduler() -> SearchScheduler {
    let search = ForumSearchFallback::new(Arc::new(MemoryKvStore::new()), SearchConfig::default())
        .with_cache(Arc::new(MemoryPostCache::new(forum_cache())));
    SearchScheduler::new(Arc::new(search), Duration::from_millis(300))
}

#[tokio::test(start_paused = true)]
async fn typing_publishes_only_the_settled_query() {
    let scheduler = scheduler();
    let mut results = scheduler.subscribe();

    for partial in ["#", "#l", "#la", "#lab", "#labour"] {
        scheduler.submit(partial, SearchOptions::default());
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    results.changed().await.unwrap();
    let published = results.borrow_and_update().clone().unwrap();

    assert_eq!(published.generation, 5);
    assert_eq!(published.generation, scheduler.latest_generation());
    assert_eq!(published.response.query, "#labour");
    assert_eq!(published.response.source, SearchSource::Cache);
    assert_eq!(ids(&published.response.data), ["p1", "p5"]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!results.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn cleared_input_cancels_the_pending_search() {
    let scheduler = scheduler();
    let results = scheduler.subscribe();

    scheduler.submit("fence", SearchOptions::default());
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.cancel();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(results.borrow().is_none());
}
