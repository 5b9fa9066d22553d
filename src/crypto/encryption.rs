//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption for a single string value. Each
//! encryption draws a fresh 96-bit nonce from the OS random source, so a
//! nonce is never reused under the same key.
//!
//! Whether the cipher can be used at all is decided once, up front, by
//! [`CipherCapability::detect`]. Callers branch on the returned tag instead
//! of catching errors from inside the cipher.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

use crate::error::{StoreError, StoreResult};

use super::key_derivation::{derive_key, DerivedKey};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Nonce and ciphertext (with appended tag) for one sealed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Handle to a working AES-256-GCM implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher {
    _private: (),
}

impl AesGcmCipher {
    /// Encrypt a string under the given key with a fresh nonce
    pub fn encrypt(&self, plaintext: &str, key: &DerivedKey) -> StoreResult<SealedValue> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| StoreError::CryptoUnavailable(format!("Failed to create cipher: {}", e)))?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.try_fill_bytes(&mut nonce).map_err(|e| {
            StoreError::CryptoUnavailable(format!("Secure random source failed: {}", e))
        })?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| StoreError::CryptoUnavailable(format!("Encryption failed: {}", e)))?;

        Ok(SealedValue { nonce, ciphertext })
    }

    /// Decrypt and authenticate a sealed value
    ///
    /// Fails closed: a wrong key or any modification of nonce or ciphertext
    /// yields `StoreError::Decryption`, never altered plaintext.
    pub fn decrypt(&self, sealed: &SealedValue, key: &DerivedKey) -> StoreResult<String> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| StoreError::CryptoUnavailable(format!("Failed to create cipher: {}", e)))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
            .map_err(|_| {
                StoreError::Decryption("invalid key or corrupted data".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| StoreError::Decryption(format!("Invalid UTF-8 in decrypted data: {}", e)))
    }
}

/// Result of probing the runtime for a usable cipher
#[derive(Debug, Clone)]
pub enum CipherCapability {
    Available(AesGcmCipher),
    Unavailable { reason: String },
}

impl CipherCapability {
    /// Self-test the cipher and random source
    ///
    /// Seals a probe value under a throwaway key and opens it again. Any
    /// failure along the way marks the cipher unavailable.
    pub fn detect() -> Self {
        let cipher = AesGcmCipher::default();
        let key = derive_key("secure-store capability probe");
        let probe = "probe";

        let outcome = cipher
            .encrypt(probe, &key)
            .and_then(|sealed| cipher.decrypt(&sealed, &key));

        match outcome {
            Ok(opened) if opened == probe => Self::Available(cipher),
            Ok(_) => Self::unavailable("cipher self-test returned wrong plaintext"),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    /// Mark the cipher unavailable with a reason
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// The cipher handle, if available
    pub fn cipher(&self) -> Option<&AesGcmCipher> {
        match self {
            Self::Available(cipher) => Some(cipher),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether values written under this capability are confidential
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}
