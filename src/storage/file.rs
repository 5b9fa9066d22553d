//! JSON file backend
//!
//! Persists every storage key and payload as one JSON object. Each write
//! rewrites the whole file atomically, so a crash mid-write leaves the
//! previous contents intact. Intended for small amounts of state such as
//! preferences and sync timestamps.
//!
//! File I/O runs on tokio's blocking pool so the fsync in each write never
//! stalls a runtime worker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task;

use crate::error::{StoreError, StoreResult};

use super::backend::PersistenceBackend;
use super::file_io::{read_json, write_json_atomic};

/// Backend storing all entries in a single JSON file
#[derive(Debug)]
pub struct JsonFileBackend {
    path: Arc<PathBuf>,
    /// Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Create a backend for the given file (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    async fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        let path = Arc::clone(&self.path);
        blocking(move || read_json(path.as_path())).await
    }

    async fn store(&self, entries: BTreeMap<String, String>) -> StoreResult<()> {
        let path = Arc::clone(&self.path);
        blocking(move || write_json_atomic(path.as_path(), &entries)).await
    }
}

async fn blocking<T, F>(work: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Io(format!("File task failed: {}", e)))?
}

#[async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self
            .load()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self
            .load()
            .await
            .map_err(|e| StoreError::backend_write(key, e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.store(entries)
            .await
            .map_err(|e| StoreError::backend_write(key, e.to_string()))
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self
            .load()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if entries.remove(key).is_some() {
            self.store(entries)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(temp_dir.path().join("store.json"));
        assert_eq!(backend.get("ns:k").await.unwrap(), None);
        assert!(!backend.path().exists());
    }

    #[tokio::test]
    async fn test_entries_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        JsonFileBackend::new(&path).set("ns:k", "payload").await.unwrap();

        let reopened = JsonFileBackend::new(&path);
        assert_eq!(reopened.get("ns:k").await.unwrap().as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(temp_dir.path().join("store.json"));

        backend.set("ns:k", "payload").await.unwrap();
        backend.remove("ns:k").await.unwrap();
        backend.remove("ns:k").await.unwrap();
        assert_eq!(backend.get("ns:k").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_all_persist() {
        let temp_dir = TempDir::new().unwrap();
        let backend = Arc::new(JsonFileBackend::new(temp_dir.path().join("store.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let backend = Arc::clone(&backend);
                tokio::spawn(async move { backend.set(&format!("ns:k{}", i), "payload").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = JsonFileBackend::new(backend.path());
        for i in 0..8 {
            assert!(reopened.get(&format!("ns:k{}", i)).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        let err = backend.set("ns:k", "payload").await.unwrap_err();
        assert!(err.is_backend_write());
        assert!(backend.get("ns:k").await.is_err());
    }
}
