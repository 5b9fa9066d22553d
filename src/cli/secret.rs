//! Secret input for CLI commands
//!
//! Secrets come from flags or environment variables. When no current secret
//! is given the user is prompted with hidden input.

use crate::crypto::SecureString;
use crate::error::{StoreError, StoreResult};

/// Use the given secret, or prompt for one
pub fn resolve_secret(provided: Option<String>) -> StoreResult<SecureString> {
    let secret = match provided {
        Some(secret) => SecureString::new(secret),
        None => prompt_secret("Enter secret: ")?,
    };

    if secret.is_empty() {
        return Err(StoreError::Config("Secret must not be empty".to_string()));
    }
    Ok(secret)
}

/// Turn raw fallback values into secrets, byte for byte and in order
pub fn fallback_secrets(raw: Vec<String>) -> StoreResult<Vec<SecureString>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, secret)| {
            if secret.is_empty() {
                return Err(StoreError::Config(format!(
                    "Fallback secret #{} must not be empty",
                    index + 1
                )));
            }
            Ok(SecureString::new(secret))
        })
        .collect()
}

/// Prompt for a secret (hidden input)
fn prompt_secret(prompt: &str) -> StoreResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| {
            StoreError::Config(format!(
                "No secret given and prompting failed ({}); set SECURE_STORE_SECRET or pass --secret",
                e
            ))
        })
}
