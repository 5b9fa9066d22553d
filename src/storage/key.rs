//! Storage key composition
//!
//! A storage key is `namespace + ":" + key`. Inside either part, `\` is
//! written as `\\` and `:` as `\:`, so exactly one unescaped separator
//! exists and no two (namespace, key) pairs compose to the same string.
//! Parts without either character compose to the plain `namespace:key`
//! form.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Separator between namespace and local key
pub const KEY_SEPARATOR: char = ':';

const ESCAPE: char = '\\';

/// A namespace and local key, composed for the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    namespace: String,
    key: String,
}

impl StorageKey {
    /// Build a storage key, rejecting an empty namespace
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> StoreResult<Self> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(StoreError::Validation("Namespace must not be empty".to_string()));
        }
        Ok(Self {
            namespace,
            key: key.into(),
        })
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            escape(&self.namespace),
            KEY_SEPARATOR,
            escape(&self.key)
        )
    }
}

fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if c == ESCAPE || c == KEY_SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}
