//! Base64 text encoding for binary ciphertext
//!
//! Persistence backends only accept strings, so nonces and ciphertext are
//! stored as standard (padded) base64.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{StoreError, StoreResult};

/// Encode bytes as base64 text
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text into bytes
pub fn decode(text: &str) -> StoreResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| StoreError::Codec(format!("Invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode(b"hello"), "aGVsbG8=");
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn test_decode_known_value() {
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_binary_bytes_survive() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_invalid_text_is_codec_error() {
        let err = decode("not base64!").unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn test_non_canonical_padding_rejected() {
        // Trailing bits must be zero
        assert!(decode("aGVsbG9=").is_err());
        assert!(decode("aGVsbG8").is_err());
    }
}
