//! Stored payload format
//!
//! Two self-describing text forms reach the backend:
//!
//! - sealed: `base64(nonce) + "." + base64(ciphertext)`
//! - fallback: `"UNENCRYPTED:" + base64(plaintext)`
//!
//! The marker contains `:`, which never appears in standard base64, so a
//! sealed payload can never be mistaken for a fallback one. Both forms are
//! read by the same parser; renaming the separator or the marker breaks
//! every value already persisted.
//!
//! The fallback form provides no confidentiality and no integrity. It only
//! exists so the host keeps working when the cipher is unavailable.

use std::fmt;

use crate::error::{StoreError, StoreResult};

use super::codec;
use super::encryption::{SealedValue, NONCE_SIZE};

/// Prefix marking a value stored without encryption
pub const FALLBACK_MARKER: &str = "UNENCRYPTED:";

/// Separator between nonce and ciphertext in a sealed payload
pub const SEALED_SEPARATOR: char = '.';

/// A payload as read from or written to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Authenticated-cipher output
    Sealed(SealedValue),
    /// Marked, non-cryptographic encoding (base64 text after the marker)
    Fallback(String),
}

impl Payload {
    /// Parse stored text into a payload
    ///
    /// Fallback payloads are recognised by their marker and kept encoded;
    /// use [`decode_fallback`] to recover the plaintext. Anything else must
    /// be a well-formed sealed payload.
    pub fn parse(text: &str) -> StoreResult<Self> {
        if is_fallback(text) {
            return Ok(Self::Fallback(text[FALLBACK_MARKER.len()..].to_string()));
        }

        let (nonce_text, ciphertext_text) = text
            .split_once(SEALED_SEPARATOR)
            .ok_or_else(|| StoreError::Codec("Sealed payload missing separator".to_string()))?;

        let nonce_bytes = codec::decode(nonce_text)?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            StoreError::Codec(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            ))
        })?;

        let ciphertext = codec::decode(ciphertext_text)?;

        Ok(Self::Sealed(SealedValue { nonce, ciphertext }))
    }

    /// Whether this payload carries confidentiality
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed(_))
    }
}

impl From<SealedValue> for Payload {
    fn from(sealed: SealedValue) -> Self {
        Self::Sealed(sealed)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sealed(sealed) => write!(
                f,
                "{}{}{}",
                codec::encode(&sealed.nonce),
                SEALED_SEPARATOR,
                codec::encode(&sealed.ciphertext)
            ),
            Self::Fallback(encoded) => write!(f, "{}{}", FALLBACK_MARKER, encoded),
        }
    }
}

/// Check whether stored text uses the fallback encoding
pub fn is_fallback(text: &str) -> bool {
    text.starts_with(FALLBACK_MARKER)
}

/// Encode plaintext in the marked, unencrypted fallback form
pub fn encode_fallback(plaintext: &str) -> String {
    format!("{}{}", FALLBACK_MARKER, codec::encode(plaintext.as_bytes()))
}

/// Decode a marked fallback value; `None` on any malformed input
pub fn decode_fallback(marked: &str) -> Option<String> {
    let encoded = marked.strip_prefix(FALLBACK_MARKER)?;
    let bytes = codec::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
