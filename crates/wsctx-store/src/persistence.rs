//! Durable key-value storage for the last active workspace
//!
//! The stored value is advisory: the backend's current workspace wins when
//! it is available.

use crate::error::PersistenceError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// String key-value storage
#[async_trait]
pub trait PersistenceAdapter: Send + Sync + 'static {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write a value
    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete a value; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: DashMap<String, String>,
}

impl MemoryPersistence {
    /// Create empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage holding one entry
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.entries.insert(key.into(), value.into());
        storage
    }

    /// Read without awaiting
    #[inline]
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryPersistence {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON object on disk
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a truncated file behind.
#[derive(Debug)]
pub struct FilePersistence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePersistence {
    /// Storage backed by `path`; the file is created on first write
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for FilePersistence {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_set_get_remove() {
        let storage = MemoryPersistence::new();
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
        // removing twice is fine
        storage.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn file_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FilePersistence::new(&path)
            .set("current_workspace_id", "ws_42")
            .await
            .unwrap();

        let reopened = FilePersistence::new(&path);
        assert_eq!(
            reopened.get("current_workspace_id").await.unwrap().as_deref(),
            Some("ws_42")
        );
    }

    #[tokio::test]
    async fn file_missing_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilePersistence::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("anything").await.unwrap(), None);
        storage.remove("anything").await.unwrap();
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn file_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilePersistence::new(dir.path().join("state.json"));

        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        storage.remove("a").await.unwrap();

        assert_eq!(storage.get("a").await.unwrap(), None);
        assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn file_corrupt_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();

        let storage = FilePersistence::new(&path);
        assert!(matches!(
            storage.get("k").await,
            Err(PersistenceError::Serialization(_))
        ));
    }
}
