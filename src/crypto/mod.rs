//! Cryptographic building blocks for the secure store
//!
//! Provides AES-256-GCM encryption with SHA-256 (or Argon2id) key derivation,
//! the self-describing payload format, and the marked fallback encoding used
//! when the cipher is unavailable.

pub mod codec;
pub mod encryption;
pub mod key_derivation;
pub mod payload;
pub mod secrets;
pub mod secure_memory;

pub use encryption::{AesGcmCipher, CipherCapability, SealedValue};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivation, KeyDerivationParams};
pub use payload::{decode_fallback, encode_fallback, is_fallback, Payload, FALLBACK_MARKER};
pub use secrets::SecretRing;
pub use secure_memory::SecureString;
