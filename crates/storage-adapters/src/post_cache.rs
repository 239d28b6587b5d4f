//! # MemoryPostCache
//!
//! The forum's client-side post list. The forum screens own it: they
//! replace it after a fetch, prepend optimistic posts, and drop deleted
//! ones. Search only ever reads it through [`PostCache`].

use async_trait::async_trait;
use domains::{CachedPost, PostCache, Result};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryPostCache {
    posts: RwLock<Vec<CachedPost>>,
}

impl MemoryPostCache {
    pub fn new(posts: Vec<CachedPost>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    /// Swaps in a freshly fetched page of posts.
    pub async fn replace_all(&self, posts: Vec<CachedPost>) {
        let mut guard = self.posts.write().await;
        debug!(previous = guard.len(), current = posts.len(), "post cache replaced");
        *guard = posts;
    }

    /// Puts a just-submitted post at the front before the server confirms it.
    /// An existing entry with the same id is replaced.
    pub async fn insert_optimistic(&self, post: CachedPost) {
        let mut guard = self.posts.write().await;
        guard.retain(|existing| existing.id() != post.id());
        guard.insert(0, post);
    }

    /// Returns true when a post was removed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.posts.write().await;
        let before = guard.len();
        guard.retain(|post| post.id() != id);
        guard.len() != before
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl PostCache for MemoryPostCache {
    async fn cached_posts(&self) -> Result<Vec<CachedPost>> {
        Ok(self.posts.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts(json: &str) -> Vec<CachedPost> {
        CachedPost::parse_list(json).unwrap()
    }

    #[tokio::test]
    async fn optimistic_posts_come_first_and_replace_duplicates() {
        let cache = MemoryPostCache::new(posts(
            r#"[{"id": "1", "body": "first"}, {"id": "2", "body": "second"}]"#,
        ));

        let mut new_post = posts(r#"[{"id": "2", "content": "edited", "user": {"isLawyer": true}}]"#);
        cache.insert_optimistic(new_post.remove(0)).await;

        let ids: Vec<String> = cache
            .cached_posts()
            .await
            .unwrap()
            .iter()
            .map(|post| post.id().to_string())
            .collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[tokio::test]
    async fn replace_and_remove() {
        let cache = MemoryPostCache::default();
        assert!(cache.is_empty().await);

        cache
            .replace_all(posts(r#"[{"id": "a", "body": "x"}, {"id": "b", "body": "y"}]"#))
            .await;
        assert_eq!(cache.len().await, 2);

        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert_eq!(cache.cached_posts().await.unwrap()[0].id(), "b");
    }
}
