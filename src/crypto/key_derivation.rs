//! Key derivation from host-supplied secrets
//!
//! Turns an arbitrary-length secret string into the 256-bit key AES-256-GCM
//! needs. The default is a single SHA-256 pass over the secret's UTF-8
//! bytes. Argon2id with a fixed configured salt is available for hosts whose
//! secrets are low-entropy passphrases; it is equally deterministic.
//!
//! Keys are never persisted. They are recomputed for every operation and
//! zeroed when dropped.
//!
//! Precondition: the secret is non-empty. `StoreConfig` enforces this before
//! a store is built, so nothing here checks it again.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{StoreError, StoreResult};

/// Length of a derived key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Minimum salt length accepted by Argon2
const MIN_SALT_LEN: usize = 8;

/// Parameters for Argon2id key derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Fixed application salt; changing it changes every derived key
    pub salt: String,
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 2)
    pub time_cost: u32,
    /// Parallelism degree (default: 1)
    pub parallelism: u32,
}

impl KeyDerivationParams {
    /// Create params with the default costs and the given salt
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }

    /// Check the salt is long enough for Argon2
    pub fn validate(&self) -> StoreResult<()> {
        if self.salt.len() < MIN_SALT_LEN {
            return Err(StoreError::KeyDerivation(format!(
                "Salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }
        Ok(())
    }

    /// Create params with specific values
    pub fn with_values(salt: String, memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            salt,
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// Which one-way function maps a secret to a key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KeyDerivation {
    /// SHA-256 of the secret bytes
    #[default]
    Sha256,
    /// Argon2id with fixed parameters
    Argon2id(KeyDerivationParams),
}

impl KeyDerivation {
    /// Human-readable algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Argon2id(_) => "Argon2id",
        }
    }

    /// Derive a key from a secret
    pub fn derive(&self, secret: &str) -> StoreResult<DerivedKey> {
        match self {
            Self::Sha256 => Ok(derive_key(secret)),
            Self::Argon2id(params) => derive_key_argon2(secret, params),
        }
    }
}

/// A derived encryption key
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The 32-byte key for AES-256
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

/// Derive a key from a secret with SHA-256
pub fn derive_key(secret: &str) -> DerivedKey {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest);
    DerivedKey { key }
}

/// Derive a key from a secret with Argon2id
pub fn derive_key_argon2(secret: &str, params: &KeyDerivationParams) -> StoreResult<DerivedKey> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| StoreError::KeyDerivation(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(secret.as_bytes(), params.salt.as_bytes(), &mut key)
        .map_err(|e| StoreError::KeyDerivation(format!("Argon2 hashing failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params(salt: &str) -> KeyDerivationParams {
        KeyDerivationParams::with_values(salt.to_string(), 256, 1, 1)
    }

    #[test]
    fn test_sha256_known_answer() {
        // SHA-256("abc")
        let expected: [u8; KEY_LEN] = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(derive_key("abc").as_bytes(), &expected);
    }

    #[test]
    fn test_same_secret_same_key() {
        let key1 = derive_key("test_secret");
        let key2 = derive_key("test_secret");
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let key1 = derive_key("secret1");
        let key2 = derive_key("secret2");
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_long_secret_not_truncated() {
        let base = "x".repeat(64);
        let key1 = derive_key(&format!("{}a", base));
        let key2 = derive_key(&format!("{}b", base));
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_argon2_deterministic() {
        let params = cheap_params("fixed-app-salt");
        let key1 = derive_key_argon2("passphrase", &params).unwrap();
        let key2 = derive_key_argon2("passphrase", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_argon2_differs_from_sha256() {
        let params = cheap_params("fixed-app-salt");
        let argon = KeyDerivation::Argon2id(params).derive("passphrase").unwrap();
        let sha = KeyDerivation::Sha256.derive("passphrase").unwrap();
        assert_ne!(argon.as_bytes(), sha.as_bytes());
    }

    #[test]
    fn test_argon2_short_salt_fails() {
        let result = derive_key_argon2("passphrase", &cheap_params("short"));
        assert!(matches!(result, Err(StoreError::KeyDerivation(_))));
    }

    #[test]
    fn test_key_derivation_serde() {
        let json = serde_json::to_string(&KeyDerivation::Sha256).unwrap();
        assert_eq!(json, r#"{"algorithm":"sha256"}"#);

        let argon = KeyDerivation::Argon2id(cheap_params("fixed-app-salt"));
        let json = serde_json::to_string(&argon).unwrap();
        let back: KeyDerivation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, argon);
    }
}
