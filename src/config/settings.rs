//! Persisted settings for the secure store CLI
//!
//! Holds the default namespace, the key derivation choice and where the data
//! file lives. Secrets never go in here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::StorePaths;
use crate::crypto::KeyDerivation;
use crate::error::StoreError;
use crate::storage::write_json_atomic;

/// User settings for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Namespace used when none is given on the command line
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How secrets are hashed into keys
    #[serde(default)]
    pub key_derivation: KeyDerivation,

    /// Data file override (defaults to `store.json` next to the settings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            namespace: default_namespace(),
            key_derivation: KeyDerivation::default(),
            data_file: None,
        }
    }
}

impl Settings {
    /// Resolve the data file path
    pub fn data_file(&self, paths: &StorePaths) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| paths.default_data_file())
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &StorePaths) -> Result<Self, StoreError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| StoreError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                StoreError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &StorePaths) -> Result<(), StoreError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
