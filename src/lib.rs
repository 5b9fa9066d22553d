//! Secure Store - encrypted, namespaced key-value storage
//!
//! This library persists sensitive client-side state (privacy preferences,
//! onboarding progress, sync timestamps) through any string key/value
//! backend, encrypting every value with AES-256-GCM before it is written.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Store configuration, CLI paths and settings
//! - `crypto`: Key derivation, cipher, payload format, secret rotation
//! - `error`: Custom error types
//! - `storage`: Backend trait, key composition, bundled backends
//! - `store`: The namespaced store
//! - `cli`: Command handlers for the `secure-store` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use secure_store::{MemoryBackend, SecureStore, StoreConfig};
//!
//! let config = StoreConfig::new("privacy", current_secret)
//!     .with_fallback_secrets([previous_secret]);
//! let store = SecureStore::new(config, MemoryBackend::new())?;
//!
//! store.set_item("privacy", "masked", "true").await?;
//! let masked = store.get_item("privacy", "masked").await?.unwrap_or_default();
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use storage::{JsonFileBackend, MemoryBackend, PersistenceBackend};
pub use store::{MigrationOutcome, ReadOutcome, ReadSource, ScopedStore, SecureStore};
