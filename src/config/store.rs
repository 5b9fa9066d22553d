//! Construction-time configuration for a store
//!
//! Secrets are passed in explicitly rather than read from ambient state, so
//! stores with different secrets can coexist in one process.

use crate::crypto::{KeyDerivation, SecretRing, SecureString};
use crate::error::{StoreError, StoreResult};

/// Everything a [`SecureStore`](crate::store::SecureStore) needs besides its backend
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Default namespace for the scoped handle
    pub namespace: String,
    /// Current secret plus retained fallback secrets
    pub secrets: SecretRing,
    /// How secrets are hashed into keys
    pub key_derivation: KeyDerivation,
}

impl StoreConfig {
    /// Create a config with no fallback secrets and SHA-256 derivation
    pub fn new(namespace: impl Into<String>, secret: impl Into<SecureString>) -> Self {
        Self {
            namespace: namespace.into(),
            secrets: SecretRing::new(secret, Vec::<SecureString>::new()),
            key_derivation: KeyDerivation::default(),
        }
    }

    /// Retain secrets from earlier rotations, tried in the given order
    pub fn with_fallback_secrets<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SecureString>,
    {
        let current = self.secrets.current().clone();
        self.secrets = SecretRing::new(current, fallbacks);
        self
    }

    /// Select the key derivation function
    pub fn with_key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = key_derivation;
        self
    }

    /// Check the preconditions the crypto layer relies on
    pub fn validate(&self) -> StoreResult<()> {
        if self.namespace.is_empty() {
            return Err(StoreError::Config("Namespace must not be empty".to_string()));
        }
        if self.secrets.current().is_empty() {
            return Err(StoreError::Config("Current secret must not be empty".to_string()));
        }
        if let Some(position) = self.secrets.fallbacks().iter().position(|s| s.is_empty()) {
            return Err(StoreError::Config(format!(
                "Fallback secret #{} must not be empty",
                position + 1
            )));
        }
        Ok(())
    }
}
