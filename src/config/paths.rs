//! Path management for the secure store CLI
//!
//! ## Path Resolution Order
//!
//! 1. `SECURE_STORE_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (e.g. `~/.config/secure-store` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::StoreError;

/// Environment variable overriding the base directory
pub const DIR_ENV_VAR: &str = "SECURE_STORE_DIR";

/// Manages all paths used by the CLI
#[derive(Debug, Clone)]
pub struct StorePaths {
    /// Base directory for settings and data
    base_dir: PathBuf,
}

impl StorePaths {
    /// Create a new StorePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = match std::env::var(DIR_ENV_VAR) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "secure-store")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    StoreError::Config("Could not determine a config directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create StorePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default location of the JSON data file
    pub fn default_data_file(&self) -> PathBuf {
        self.base_dir.join("store.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| StoreError::Io(format!("Failed to create base directory: {}", e)))
    }
}
