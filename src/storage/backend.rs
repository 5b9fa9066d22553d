//! Persistence backend contract
//!
//! The store never talks to a concrete medium directly. Anything that can
//! get, set and remove strings by string key can back it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// A string key/value medium the store writes encrypted payloads into.
///
/// # Contract
///
/// - `get` returns `Ok(None)` for an absent key
/// - `set` may fail on capacity or permission problems; the store surfaces
///   that failure to its caller
/// - `remove` on an absent key is not an error
///
/// Concurrency discipline is the backend's own: the store does not serialize
/// calls, so concurrent writes to one key land in whatever order the backend
/// applies them.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key` if present
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
impl<B: PersistenceBackend + ?Sized> PersistenceBackend for Arc<B> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key).await
    }
}
