//! Namespaced encrypted store
//!
//! `SecureStore` is the public surface: get/set/remove by (namespace, key),
//! composing key derivation, the cipher or fallback encoder, and the
//! injected backend.
//!
//! Error policy:
//! - reads never fail because of stored data. Missing, malformed,
//!   tampered or undecryptable values all come back as `None`. Only errors
//!   outside `StoreError::is_read_recoverable` are returned, such as a broken
//!   key derivation or an invalid namespace.
//! - writes propagate every failure, backend rejections included.
//! - removals are best effort and only log failures.
//!
//! The store keeps no state between calls and takes no locks. Concurrent
//! writes to the same key race at the backend and the last one to land wins.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::StoreConfig;
use crate::crypto::{
    decode_fallback, encode_fallback, CipherCapability, KeyDerivation, Payload, SecretRing,
};
use crate::error::{StoreError, StoreResult};
use crate::storage::{PersistenceBackend, StorageKey};

/// Which secret (or encoding) a value was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Opened with the current secret
    Current,
    /// Opened with the retained secret at this position in the fallback list
    Retained(usize),
    /// Stored in the marked, unencrypted fallback encoding
    Unencrypted,
}

/// Full result of reading one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Nothing stored under the key
    Missing,
    /// Something is stored but no candidate could read it
    Unreadable,
    /// The plaintext and how it was recovered
    Found { plaintext: String, source: ReadSource },
}

impl ReadOutcome {
    /// The plaintext, if the value was readable
    pub fn into_plaintext(self) -> Option<String> {
        match self {
            Self::Found { plaintext, .. } => Some(plaintext),
            Self::Missing | Self::Unreadable => None,
        }
    }
}

/// What [`SecureStore::migrate_item`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Nothing stored under the key
    Missing,
    /// Already in the best form available; left untouched
    Current,
    /// Rewritten under the current secret
    Reencrypted,
    /// No candidate could read it; left untouched
    Unreadable,
}

/// Encrypted key-value store over a persistence backend
pub struct SecureStore<B> {
    backend: B,
    namespace: String,
    secrets: SecretRing,
    key_derivation: KeyDerivation,
    capability: CipherCapability,
}

impl<B: PersistenceBackend> SecureStore<B> {
    /// Create a store, probing the runtime for a usable cipher
    pub fn new(config: StoreConfig, backend: B) -> StoreResult<Self> {
        Self::with_capability(config, backend, CipherCapability::detect())
    }

    /// Create a store with an explicit cipher capability
    ///
    /// An `Unavailable` capability switches writes to the unencrypted
    /// fallback encoding. That is logged once here.
    pub fn with_capability(
        config: StoreConfig,
        backend: B,
        capability: CipherCapability,
    ) -> StoreResult<Self> {
        config.validate()?;

        if let CipherCapability::Unavailable { reason } = &capability {
            warn!(
                namespace = %config.namespace,
                %reason,
                "Authenticated encryption unavailable; values will be stored UNENCRYPTED"
            );
        }

        Ok(Self {
            backend,
            namespace: config.namespace,
            secrets: config.secrets,
            key_derivation: config.key_derivation,
            capability,
        })
    }

    /// The backend this store writes to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The configured default namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn capability(&self) -> &CipherCapability {
        &self.capability
    }

    pub fn key_derivation(&self) -> &KeyDerivation {
        &self.key_derivation
    }

    /// Whether new writes are encrypted
    ///
    /// Callers that need confidentiality should check this and warn the
    /// user when it is false.
    pub fn is_confidential(&self) -> bool {
        self.capability.is_available()
    }

    /// Handle bound to the configured namespace
    pub fn scoped(&self) -> ScopedStore<'_, B> {
        ScopedStore { store: self }
    }

    /// Read and decrypt a value; `None` if absent or unreadable
    pub async fn get_item(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_item(namespace, key).await?.into_plaintext())
    }

    /// Read a value and report how it was recovered
    pub async fn read_item(&self, namespace: &str, key: &str) -> StoreResult<ReadOutcome> {
        let storage_key = StorageKey::new(namespace, key)?.to_string();

        let raw = match self.backend.get(&storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(ReadOutcome::Missing),
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Backend read failed; treating value as absent");
                return Ok(ReadOutcome::Missing);
            }
        };

        let sealed = match Payload::parse(&raw) {
            Ok(Payload::Sealed(sealed)) => sealed,
            Ok(Payload::Fallback(_)) => {
                return Ok(match decode_fallback(&raw) {
                    Some(plaintext) => {
                        if self.is_confidential() {
                            warn!(
                                key = %storage_key,
                                "Read an UNENCRYPTED value while encryption is available"
                            );
                        }
                        ReadOutcome::Found {
                            plaintext,
                            source: ReadSource::Unencrypted,
                        }
                    }
                    None => {
                        debug!(key = %storage_key, "Malformed unencrypted payload");
                        ReadOutcome::Unreadable
                    }
                });
            }
            Err(e) if e.is_read_recoverable() => {
                debug!(key = %storage_key, error = %e, "Unparseable payload");
                return Ok(ReadOutcome::Unreadable);
            }
            Err(e) => return Err(e),
        };

        let Some(cipher) = self.capability.cipher() else {
            debug!(key = %storage_key, "Cipher unavailable; cannot open sealed payload");
            return Ok(ReadOutcome::Unreadable);
        };

        for (index, secret) in self.secrets.candidates().enumerate() {
            let derived = self.key_derivation.derive(secret)?;
            match cipher.decrypt(&sealed, &derived) {
                Ok(plaintext) => {
                    let source = match index {
                        0 => ReadSource::Current,
                        n => ReadSource::Retained(n - 1),
                    };
                    return Ok(ReadOutcome::Found { plaintext, source });
                }
                Err(e) if e.is_read_recoverable() => {
                    debug!(key = %storage_key, candidate = index, error = %e, "Candidate secret rejected");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(key = %storage_key, "No candidate secret could open the payload");
        Ok(ReadOutcome::Unreadable)
    }

    /// Encrypt a value and write it under the current secret
    ///
    /// Backend failures (e.g. quota exceeded) are returned as
    /// `StoreError::BackendWrite` so the caller can react.
    #[instrument(level = "debug", skip(self, plaintext))]
    pub async fn set_item(&self, namespace: &str, key: &str, plaintext: &str) -> StoreResult<()> {
        let storage_key = StorageKey::new(namespace, key)?.to_string();
        let payload = self.seal(plaintext)?;

        self.backend
            .set(&storage_key, &payload)
            .await
            .map_err(|e| {
                if e.is_backend_write() {
                    e
                } else {
                    StoreError::backend_write(&storage_key, e.to_string())
                }
            })
    }

    /// Delete a value; failures are logged, never returned
    pub async fn remove_item(&self, namespace: &str, key: &str) {
        let storage_key = match StorageKey::new(namespace, key) {
            Ok(storage_key) => storage_key.to_string(),
            Err(e) => {
                warn!(%namespace, %key, error = %e, "Cannot remove value with invalid key");
                return;
            }
        };

        if let Err(e) = self.backend.remove(&storage_key).await {
            warn!(key = %storage_key, error = %e, "Failed to remove value");
        }
    }

    /// Read a JSON-encoded value; `None` if absent, unreadable or mistyped
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let Some(text) = self.get_item(namespace, key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(%namespace, %key, error = %e, "Stored value does not match expected shape");
                Ok(None)
            }
        }
    }

    /// Serialize a value as JSON and write it encrypted
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.set_item(namespace, key, &text).await
    }

    /// Rewrite a value under the current secret if it was read another way
    ///
    /// Values opened with a retained secret are re-encrypted. Values in the
    /// unencrypted encoding are re-encrypted once the cipher is available.
    #[instrument(level = "debug", skip(self))]
    pub async fn migrate_item(&self, namespace: &str, key: &str) -> StoreResult<MigrationOutcome> {
        match self.read_item(namespace, key).await? {
            ReadOutcome::Missing => Ok(MigrationOutcome::Missing),
            ReadOutcome::Unreadable => Ok(MigrationOutcome::Unreadable),
            ReadOutcome::Found { source: ReadSource::Current, .. } => Ok(MigrationOutcome::Current),
            ReadOutcome::Found { source: ReadSource::Unencrypted, .. } if !self.is_confidential() => {
                Ok(MigrationOutcome::Current)
            }
            ReadOutcome::Found { plaintext, .. } => {
                self.set_item(namespace, key, &plaintext).await?;
                Ok(MigrationOutcome::Reencrypted)
            }
        }
    }

    fn seal(&self, plaintext: &str) -> StoreResult<String> {
        let payload = match self.capability.cipher() {
            Some(cipher) => {
                let derived = self.key_derivation.derive(self.secrets.current())?;
                Payload::from(cipher.encrypt(plaintext, &derived)?).to_string()
            }
            None => encode_fallback(plaintext),
        };

        debug_assert!(
            Payload::parse(&payload).is_ok(),
            "store produced a payload it cannot parse"
        );
        Ok(payload)
    }
}

/// A [`SecureStore`] bound to its configured namespace
pub struct ScopedStore<'a, B> {
    store: &'a SecureStore<B>,
}

impl<B: PersistenceBackend> ScopedStore<'_, B> {
    pub fn namespace(&self) -> &str {
        &self.store.namespace
    }

    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.store.get_item(&self.store.namespace, key).await
    }

    pub async fn set(&self, key: &str, plaintext: &str) -> StoreResult<()> {
        self.store.set_item(&self.store.namespace, key, plaintext).await
    }

    pub async fn remove(&self, key: &str) {
        self.store.remove_item(&self.store.namespace, key).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        self.store.get_json(&self.store.namespace, key).await
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.store.set_json(&self.store.namespace, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyDerivationParams, FALLBACK_MARKER};
    use crate::storage::MemoryBackend;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use tracing_test::traced_test;

    const UNENCRYPTED_WARNING: &str = "values will be stored UNENCRYPTED";

    fn store_with(config: StoreConfig, backend: Arc<MemoryBackend>) -> SecureStore<Arc<MemoryBackend>> {
        SecureStore::new(config, backend).unwrap()
    }

    fn simple_store(secret: &str) -> SecureStore<MemoryBackend> {
        SecureStore::new(StoreConfig::new("privacy", secret), MemoryBackend::new()).unwrap()
    }

    /// Backend where every operation fails
    struct BrokenBackend;

    #[async_trait]
    impl PersistenceBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Backend("disk on fire".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Backend("disk on fire".into()))
        }

        async fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Backend("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = simple_store("s1");
        store.set_item("privacy", "masked", "true").await.unwrap();
        assert_eq!(
            store.get_item("privacy", "masked").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_raw_value_is_sealed_not_plaintext() {
        let store = simple_store("s1");
        store.set_item("privacy", "masked", "balance-visible").await.unwrap();

        let raw = store.backend().get("privacy:masked").await.unwrap().unwrap();
        assert!(!raw.contains("balance-visible"));
        assert!(!raw.starts_with(FALLBACK_MARKER));
        assert!(matches!(Payload::parse(&raw), Ok(Payload::Sealed(_))));
    }

    #[tokio::test]
    async fn test_missing_key_returns_none() {
        let store = simple_store("s1");
        assert_eq!(store.get_item("privacy", "nothing").await.unwrap(), None);
        assert_eq!(
            store.read_item("privacy", "nothing").await.unwrap(),
            ReadOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_key_rotation_reads_old_values() {
        let backend = Arc::new(MemoryBackend::new());

        let before = store_with(StoreConfig::new("sync", "s1"), backend.clone());
        before.set_item("sync", "last_synced", "2024-05-01T10:00:00Z").await.unwrap();

        let after = store_with(
            StoreConfig::new("sync", "s2").with_fallback_secrets(["s1"]),
            backend.clone(),
        );
        assert_eq!(
            after.read_item("sync", "last_synced").await.unwrap(),
            ReadOutcome::Found {
                plaintext: "2024-05-01T10:00:00Z".to_string(),
                source: ReadSource::Retained(0),
            }
        );
    }

    #[tokio::test]
    async fn test_fallback_secrets_tried_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        store_with(StoreConfig::new("sync", "s1"), backend.clone())
            .set_item("sync", "k", "v")
            .await
            .unwrap();

        let store = store_with(
            StoreConfig::new("sync", "s3").with_fallback_secrets(["s2", "s1"]),
            backend,
        );
        assert_eq!(
            store.read_item("sync", "k").await.unwrap(),
            ReadOutcome::Found {
                plaintext: "v".to_string(),
                source: ReadSource::Retained(1),
            }
        );
    }

    #[tokio::test]
    async fn test_wrong_secret_returns_none() {
        let backend = Arc::new(MemoryBackend::new());
        store_with(StoreConfig::new("privacy", "s1"), backend.clone())
            .set_item("privacy", "masked", "true")
            .await
            .unwrap();

        let stranger = store_with(
            StoreConfig::new("privacy", "s9").with_fallback_secrets(["s8"]),
            backend,
        );
        assert_eq!(stranger.get_item("privacy", "masked").await.unwrap(), None);
        assert_eq!(
            stranger.read_item("privacy", "masked").await.unwrap(),
            ReadOutcome::Unreadable
        );
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let store = simple_store("s1");
        store.set_item("a", "k", "x").await.unwrap();

        assert_eq!(store.get_item("b", "k").await.unwrap(), None);
        assert_eq!(store.get_item("a", "k").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_separator_in_names_does_not_collide() {
        let store = simple_store("s1");
        store.set_item("a:b", "c", "first").await.unwrap();
        store.set_item("a", "b:c", "second").await.unwrap();

        assert_eq!(store.get_item("a:b", "c").await.unwrap().as_deref(), Some("first"));
        assert_eq!(store.get_item("a", "b:c").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_fallback_path_is_marked_and_round_trips() {
        let store = SecureStore::with_capability(
            StoreConfig::new("onboarding", "s1"),
            MemoryBackend::new(),
            CipherCapability::unavailable("simulated insecure context"),
        )
        .unwrap();
        assert!(!store.is_confidential());

        store.set_item("onboarding", "step", "3").await.unwrap();

        let raw = store.backend().get("onboarding:step").await.unwrap().unwrap();
        assert!(raw.starts_with(FALLBACK_MARKER));
        assert_eq!(raw, "UNENCRYPTED:Mw==");
        assert_eq!(
            store.read_item("onboarding", "step").await.unwrap(),
            ReadOutcome::Found {
                plaintext: "3".to_string(),
                source: ReadSource::Unencrypted,
            }
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn test_unavailable_cipher_warned_once() {
        let store = SecureStore::with_capability(
            StoreConfig::new("onboarding", "s1"),
            MemoryBackend::new(),
            CipherCapability::unavailable("simulated insecure context"),
        )
        .unwrap();

        store.set_item("onboarding", "step", "3").await.unwrap();
        store.set_item("onboarding", "done", "false").await.unwrap();
        assert_eq!(store.get_item("onboarding", "step").await.unwrap().as_deref(), Some("3"));

        assert!(logs_contain("simulated insecure context"));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains(UNENCRYPTED_WARNING)).count() {
                1 => Ok(()),
                n => Err(format!("expected one warning, saw {}", n)),
            }
        });
    }

    #[traced_test]
    #[tokio::test]
    async fn test_available_cipher_does_not_warn() {
        let store = simple_store("s1");
        store.set_item("privacy", "masked", "true").await.unwrap();
        assert!(!logs_contain(UNENCRYPTED_WARNING));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_unencrypted_value_read_with_cipher_is_warned() {
        let store = simple_store("s1");
        store
            .backend()
            .set("privacy:masked", &encode_fallback("false"))
            .await
            .unwrap();

        assert_eq!(
            store.read_item("privacy", "masked").await.unwrap(),
            ReadOutcome::Found {
                plaintext: "false".to_string(),
                source: ReadSource::Unencrypted,
            }
        );
        assert!(logs_contain("Read an UNENCRYPTED value while encryption is available"));
    }

    #[tokio::test]
    async fn test_malformed_fallback_returns_none() {
        let store = simple_store("s1");
        store.backend().set("privacy:masked", "UNENCRYPTED:%%%").await.unwrap();
        assert_eq!(store.get_item("privacy", "masked").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sealed_value_unreadable_without_cipher() {
        let backend = Arc::new(MemoryBackend::new());
        store_with(StoreConfig::new("privacy", "s1"), backend.clone())
            .set_item("privacy", "masked", "true")
            .await
            .unwrap();

        let degraded = SecureStore::with_capability(
            StoreConfig::new("privacy", "s1"),
            backend,
            CipherCapability::unavailable("simulated"),
        )
        .unwrap();
        assert_eq!(degraded.get_item("privacy", "masked").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tamper_detection_every_bit() {
        let store = store_with(
            StoreConfig::new("privacy", "s1").with_fallback_secrets(["s0", "s2"]),
            Arc::new(MemoryBackend::new()),
        );
        store.set_item("privacy", "masked", "on").await.unwrap();
        let original = store.backend().get("privacy:masked").await.unwrap().unwrap();

        for index in 0..original.len() {
            // Flipping the top bit would leave ASCII; the low seven cover every other bit
            for bit in 0..7 {
                let mut bytes = original.clone().into_bytes();
                bytes[index] ^= 1 << bit;
                let tampered = String::from_utf8(bytes).unwrap();

                store.backend().set("privacy:masked", &tampered).await.unwrap();
                assert_eq!(
                    store.get_item("privacy", "masked").await.unwrap(),
                    None,
                    "tampered payload {:?} was accepted",
                    tampered
                );
            }
        }
    }

    #[tokio::test]
    async fn test_garbage_payload_returns_none() {
        let store = simple_store("s1");
        for garbage in ["", ".", "no-separator", "abc.def", "BwcHBwcHBwcHBwcH."] {
            store.backend().set("privacy:masked", garbage).await.unwrap();
            assert_eq!(store.get_item("privacy", "masked").await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = simple_store("s1");
        store.set_item("privacy", "masked", "true").await.unwrap();

        store.remove_item("privacy", "masked").await;
        store.remove_item("privacy", "masked").await;

        assert_eq!(store.get_item("privacy", "masked").await.unwrap(), None);
        assert!(store.backend().is_empty().await);
    }

    #[tokio::test]
    async fn test_backend_write_failure_propagates() {
        let store = SecureStore::new(
            StoreConfig::new("privacy", "s1"),
            MemoryBackend::with_quota(32),
        )
        .unwrap();

        let err = store
            .set_item("privacy", "masked", &"x".repeat(64))
            .await
            .unwrap_err();
        assert!(err.is_backend_write());
    }

    #[tokio::test]
    async fn test_broken_backend_policy() {
        let store = SecureStore::new(StoreConfig::new("privacy", "s1"), BrokenBackend).unwrap();

        // Reads swallow, removes log, writes propagate
        assert_eq!(store.get_item("privacy", "masked").await.unwrap(), None);
        store.remove_item("privacy", "masked").await;
        let err = store.set_item("privacy", "masked", "true").await.unwrap_err();
        assert!(matches!(err, StoreError::BackendWrite { ref key, .. } if key == "privacy:masked"));
    }

    #[tokio::test]
    async fn test_key_derivation_failure_propagates_on_read() {
        let backend = Arc::new(MemoryBackend::new());
        store_with(StoreConfig::new("privacy", "s1"), backend.clone())
            .set_item("privacy", "masked", "true")
            .await
            .unwrap();

        let broken = store_with(
            StoreConfig::new("privacy", "s1").with_key_derivation(KeyDerivation::Argon2id(
                KeyDerivationParams::with_values("short".into(), 256, 1, 1),
            )),
            backend,
        );
        let err = broken.get_item("privacy", "masked").await.unwrap_err();
        assert!(matches!(err, StoreError::KeyDerivation(_)));
    }

    #[tokio::test]
    async fn test_argon2_store_round_trip() {
        let store = SecureStore::new(
            StoreConfig::new("privacy", "s1").with_key_derivation(KeyDerivation::Argon2id(
                KeyDerivationParams::with_values("fixed-app-salt".into(), 256, 1, 1),
            )),
            MemoryBackend::new(),
        )
        .unwrap();

        store.set_item("privacy", "masked", "true").await.unwrap();
        assert_eq!(store.get_item("privacy", "masked").await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let result = SecureStore::new(StoreConfig::new("privacy", ""), MemoryBackend::new());
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_namespace_is_validation_error() {
        let store = simple_store("s1");
        assert!(matches!(
            store.get_item("", "k").await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.set_item("", "k", "v").await.is_err());
        store.remove_item("", "k").await;
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OnboardingProgress {
        completed_steps: Vec<String>,
        dismissed: bool,
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let store = simple_store("s1");
        let progress = OnboardingProgress {
            completed_steps: vec!["welcome".into(), "link-account".into()],
            dismissed: false,
        };

        store.set_json("onboarding", "progress", &progress).await.unwrap();
        let loaded: Option<OnboardingProgress> =
            store.get_json("onboarding", "progress").await.unwrap();
        assert_eq!(loaded, Some(progress));
    }

    #[tokio::test]
    async fn test_json_shape_mismatch_returns_none() {
        let store = simple_store("s1");
        store.set_item("onboarding", "progress", "not json").await.unwrap();

        let loaded: Option<OnboardingProgress> =
            store.get_json("onboarding", "progress").await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_scoped_store_uses_configured_namespace() {
        let store = simple_store("s1");
        let scoped = store.scoped();
        assert_eq!(scoped.namespace(), "privacy");

        scoped.set("masked", "true").await.unwrap();
        assert_eq!(store.get_item("privacy", "masked").await.unwrap().as_deref(), Some("true"));
        assert_eq!(scoped.get("masked").await.unwrap().as_deref(), Some("true"));

        scoped.set_json("toggles", &vec![true, false]).await.unwrap();
        let toggles: Option<Vec<bool>> = scoped.get_json("toggles").await.unwrap();
        assert_eq!(toggles, Some(vec![true, false]));

        scoped.remove("masked").await;
        assert_eq!(scoped.get("masked").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_migrate_reencrypts_under_current_secret() {
        let backend = Arc::new(MemoryBackend::new());
        store_with(StoreConfig::new("sync", "s1"), backend.clone())
            .set_item("sync", "k", "v")
            .await
            .unwrap();

        let rotated = store_with(
            StoreConfig::new("sync", "s2").with_fallback_secrets(["s1"]),
            backend.clone(),
        );
        assert_eq!(
            rotated.migrate_item("sync", "k").await.unwrap(),
            MigrationOutcome::Reencrypted
        );
        assert_eq!(
            rotated.migrate_item("sync", "k").await.unwrap(),
            MigrationOutcome::Current
        );

        // The old secret can be dropped now
        let retired = store_with(StoreConfig::new("sync", "s2"), backend);
        assert_eq!(retired.get_item("sync", "k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_migrate_upgrades_unencrypted_values() {
        let backend = Arc::new(MemoryBackend::new());
        let degraded = SecureStore::with_capability(
            StoreConfig::new("privacy", "s1"),
            backend.clone(),
            CipherCapability::unavailable("simulated"),
        )
        .unwrap();
        degraded.set_item("privacy", "masked", "true").await.unwrap();
        assert_eq!(
            degraded.migrate_item("privacy", "masked").await.unwrap(),
            MigrationOutcome::Current
        );

        let store = store_with(StoreConfig::new("privacy", "s1"), backend.clone());
        assert_eq!(
            store.migrate_item("privacy", "masked").await.unwrap(),
            MigrationOutcome::Reencrypted
        );
        let raw = backend.get("privacy:masked").await.unwrap().unwrap();
        assert!(!raw.starts_with(FALLBACK_MARKER));
        assert_eq!(store.get_item("privacy", "masked").await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_migrate_missing_and_unreadable() {
        let store = simple_store("s1");
        assert_eq!(
            store.migrate_item("privacy", "nothing").await.unwrap(),
            MigrationOutcome::Missing
        );

        store.backend().set("privacy:broken", "garbage").await.unwrap();
        assert_eq!(
            store.migrate_item("privacy", "broken").await.unwrap(),
            MigrationOutcome::Unreadable
        );
        assert_eq!(
            store.backend().get("privacy:broken").await.unwrap().as_deref(),
            Some("garbage")
        );
    }

    #[tokio::test]
    async fn test_concurrent_writes_last_one_wins() {
        let store = simple_store("s1");
        let (first, second) = tokio::join!(
            store.set_item("privacy", "masked", "true"),
            store.set_item("privacy", "masked", "false"),
        );
        first.unwrap();
        second.unwrap();

        let value = store.get_item("privacy", "masked").await.unwrap().unwrap();
        assert!(value == "true" || value == "false");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip(
            namespace in "[a-z:\\\\]{1,8}",
            key in "[a-z:\\\\]{0,8}",
            plaintext in "\\PC{1,64}",
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = SecureStore::new(StoreConfig::new("ns", "secret"), MemoryBackend::new()).unwrap();

            let read = runtime.block_on(async {
                store.set_item(&namespace, &key, &plaintext).await.unwrap();
                store.get_item(&namespace, &key).await.unwrap()
            });
            prop_assert_eq!(read, Some(plaintext));
        }
    }
}
