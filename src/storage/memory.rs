//! In-process backend
//!
//! Keeps payloads in a map behind an async lock. An optional byte quota
//! makes writes fail the way a full browser-style storage area does, which
//! is how the write-failure path gets exercised.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

use super::backend::PersistenceBackend;

/// Map-backed storage held in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
    /// Maximum total bytes of keys plus values, if limited
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create an unlimited backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes beyond `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = used + entry_size(key, value);
            if needed > quota {
                return Err(StoreError::backend_write(
                    key,
                    format!("quota exceeded ({} of {} bytes)", needed, quota),
                ));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
