//! Config CLI commands
//!
//! Shows the resolved paths and settings, and persists changes to the
//! namespace, data file and key derivation.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};

use crate::config::{Settings, StorePaths};
use crate::crypto::{KeyDerivation, KeyDerivationParams};
use crate::error::{StoreError, StoreResult};

/// Configuration commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,

    /// Change persisted settings
    Set(SettingsUpdate),
}

/// Key derivation choices for `config set --kdf`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KdfChoice {
    Sha256,
    Argon2id,
}

/// Settings changes; anything not given is left as is
#[derive(Args, Debug, Default)]
pub struct SettingsUpdate {
    /// Namespace used when -n is not given
    #[arg(long)]
    pub default_namespace: Option<String>,

    /// Data file location
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Key derivation function
    #[arg(long, value_enum)]
    pub kdf: Option<KdfChoice>,

    /// Fixed application salt for Argon2id (at least 8 bytes)
    #[arg(long)]
    pub salt: Option<String>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.default_namespace.is_none()
            && self.data_file.is_none()
            && self.kdf.is_none()
            && self.salt.is_none()
    }

    /// Apply the changes, leaving `settings` untouched on error
    pub fn apply(self, settings: &mut Settings) -> StoreResult<()> {
        if self.is_empty() {
            return Err(StoreError::Config(
                "Nothing to change; pass --default-namespace, --data-file or --kdf".to_string(),
            ));
        }

        let key_derivation = match (self.kdf, self.salt) {
            (None, None) => None,
            (Some(KdfChoice::Sha256), None) => Some(KeyDerivation::Sha256),
            (Some(KdfChoice::Argon2id), Some(salt)) => {
                let params = KeyDerivationParams::with_salt(salt);
                params.validate()?;
                Some(KeyDerivation::Argon2id(params))
            }
            (Some(KdfChoice::Argon2id), None) => {
                return Err(StoreError::Config("--kdf argon2id requires --salt".to_string()))
            }
            (_, Some(_)) => {
                return Err(StoreError::Config(
                    "--salt only applies with --kdf argon2id".to_string(),
                ))
            }
        };

        if let Some(namespace) = &self.default_namespace {
            if namespace.is_empty() {
                return Err(StoreError::Config("Namespace must not be empty".to_string()));
            }
        }

        if let Some(namespace) = self.default_namespace {
            settings.namespace = namespace;
        }
        if let Some(data_file) = self.data_file {
            settings.data_file = Some(data_file);
        }
        if let Some(key_derivation) = key_derivation {
            settings.key_derivation = key_derivation;
        }
        Ok(())
    }
}

/// Handle config commands; `None` shows the configuration
pub fn handle_config_command(
    paths: &StorePaths,
    mut settings: Settings,
    data_file: &Path,
    namespace: &str,
    cmd: Option<ConfigCommands>,
) -> StoreResult<()> {
    match cmd.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            show_config(paths, &settings, data_file, namespace);
            Ok(())
        }
        ConfigCommands::Set(update) => {
            let previous_kdf = settings.key_derivation.clone();
            update.apply(&mut settings)?;
            settings.save(paths)?;

            println!("Settings saved to {}", paths.settings_file().display());
            if settings.key_derivation != previous_kdf {
                println!(
                    "Warning: values written with {} cannot be read under the new key derivation",
                    previous_kdf.name()
                );
            }
            Ok(())
        }
    }
}

fn show_config(paths: &StorePaths, settings: &Settings, data_file: &Path, namespace: &str) {
    println!("secure-store Configuration");
    println!("==========================");
    println!("Config directory: {}", paths.base_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Data file:        {}", data_file.display());
    println!();
    println!("Settings:");
    println!("  Namespace:      {}", namespace);
    println!("  Key derivation: {}", settings.key_derivation.name());
}
