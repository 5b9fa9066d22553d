//! Secret ordering for decryption attempts
//!
//! New writes always use the current secret. Reads try the current secret
//! first, then each retained secret in exactly the order the caller gave.
//! Nothing is deduplicated or re-sorted: the store has no recency metadata,
//! so rotation order is the caller's contract.

use super::secure_memory::SecureString;

/// The current secret plus the secrets retained from earlier rotations
#[derive(Debug, Clone)]
pub struct SecretRing {
    current: SecureString,
    fallbacks: Vec<SecureString>,
}

impl SecretRing {
    /// Create a ring from a current secret and ordered fallback secrets
    pub fn new<I, S>(current: impl Into<SecureString>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SecureString>,
    {
        Self {
            current: current.into(),
            fallbacks: fallbacks.into_iter().map(Into::into).collect(),
        }
    }

    /// The secret used for all new writes
    pub fn current(&self) -> &SecureString {
        &self.current
    }

    /// Retained secrets, in caller order
    pub fn fallbacks(&self) -> &[SecureString] {
        &self.fallbacks
    }

    /// Decryption candidates: current first, then fallbacks as given
    pub fn candidates(&self) -> impl Iterator<Item = &SecureString> {
        candidates(&self.current, &self.fallbacks)
    }
}

/// Order a current secret ahead of the retained ones
pub fn candidates<'a>(
    current: &'a SecureString,
    fallbacks: &'a [SecureString],
) -> impl Iterator<Item = &'a SecureString> {
    std::iter::once(current).chain(fallbacks.iter())
}
