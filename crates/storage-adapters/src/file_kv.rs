//! # FileKvStore
//!
//! Durable key-value store kept as a single JSON object on disk
//! (`{"key": "value", ...}`). Each write replaces the whole document
//! through a temp file and a rename, so a crash leaves either the old or
//! the new document and never a torn one.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domains::{DomainError, KeyValueStore, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

type Document = BTreeMap<String, String>;

pub struct FileKvStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => {
                return Err(DomainError::storage(format!(
                    "reading {}: {err}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "store document is corrupt");
            DomainError::serialization(format!("{}: {err}", self.path.display()))
        })
    }

    async fn write_document(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| DomainError::storage(format!("creating {}: {err}", parent.display())))?;
        }

        let json = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &json)
            .await
            .map_err(|err| DomainError::storage(format!("writing {}: {err}", tmp_path.display())))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| DomainError::storage(format!("replacing {}: {err}", self.path.display())))?;

        debug!(path = %self.path.display(), keys = document.len(), "store document written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(&document).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}
