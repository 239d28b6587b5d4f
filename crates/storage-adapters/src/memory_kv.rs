//! Process-local key-value store. Nothing survives a restart.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{KeyValueStore, Result};

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("guest_session").await.unwrap(), None);

        store.set("guest_session", "{}").await.unwrap();
        store.set("guest_session", "{\"id\":\"x\"}").await.unwrap();
        assert_eq!(store.get("guest_session").await.unwrap().as_deref(), Some("{\"id\":\"x\"}"));
        assert_eq!(store.len(), 1);

        store.remove("guest_session").await.unwrap();
        store.remove("guest_session").await.unwrap();
        assert!(store.is_empty());
    }
}
