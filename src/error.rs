//! Custom error types for the secure store
//!
//! This module defines the error hierarchy for the store using thiserror
//! for ergonomic error definitions. Read-path categories are swallowed into
//! an absent value by the store; write-path categories propagate.

use thiserror::Error;

/// The main error type for secure store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The authenticated cipher cannot be used in this runtime
    #[error("Authenticated encryption unavailable: {0}")]
    CryptoUnavailable(String),

    /// Hashing a secret into a key failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A payload could not be authenticated under the given key
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Stored text is not in the expected encoding
    #[error("Codec error: {0}")]
    Codec(String),

    /// The backend rejected a write
    #[error("Failed to write '{key}' to backend: {reason}")]
    BackendWrite { key: String, reason: String },

    /// No readable value under a key
    #[error("No readable value for '{0}'")]
    NotFound(String),

    /// Backend-level failure outside of writes (reads, removals)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for keys and namespaces
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl StoreError {
    /// Create a write failure for the given storage key
    pub fn backend_write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendWrite {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Errors the read path turns into "no value" instead of surfacing
    pub fn is_read_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decryption(_) | Self::Codec(_) | Self::Backend(_) | Self::Json(_)
        )
    }

    /// Check if this is a rejected backend write
    pub fn is_backend_write(&self) -> bool {
        matches!(self, Self::BackendWrite { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for secure store operations
pub type StoreResult<T> = Result<T, StoreError>;
