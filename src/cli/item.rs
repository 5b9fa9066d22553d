//! Item CLI commands
//!
//! Reads, writes, removes and migrates single values, and reports whether
//! the store is providing confidentiality.

use clap::Subcommand;

use crate::error::{StoreError, StoreResult};
use crate::storage::PersistenceBackend;
use crate::store::{MigrationOutcome, ReadOutcome, ReadSource, SecureStore};

/// Value management commands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Print the decrypted value of a key
    Get {
        /// Local key within the namespace
        key: String,
    },

    /// Encrypt and store a value
    Set {
        /// Local key within the namespace
        key: String,
        /// Plaintext value
        value: String,
    },

    /// Delete a key (succeeds if it is already gone)
    #[command(alias = "rm")]
    Remove {
        /// Local key within the namespace
        key: String,
    },

    /// Re-encrypt a key under the current secret after a rotation
    Migrate {
        /// Local key within the namespace
        key: String,
    },

    /// Show encryption status, optionally for one key
    Status {
        /// Local key within the namespace
        key: Option<String>,
    },
}

/// Handle item commands against a store
pub async fn handle_item_command<B: PersistenceBackend>(
    store: &SecureStore<B>,
    namespace: &str,
    cmd: ItemCommands,
) -> StoreResult<()> {
    match cmd {
        ItemCommands::Get { key } => match store.get_item(namespace, &key).await? {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("{}/{}", namespace, key))),
        },
        ItemCommands::Set { key, value } => {
            store.set_item(namespace, &key, &value).await?;
            if store.is_confidential() {
                println!("Stored '{}' in namespace '{}'.", key, namespace);
            } else {
                println!(
                    "WARNING: stored '{}' in namespace '{}' UNENCRYPTED (cipher unavailable).",
                    key, namespace
                );
            }
            Ok(())
        }
        ItemCommands::Remove { key } => {
            store.remove_item(namespace, &key).await;
            println!("Removed '{}' from namespace '{}'.", key, namespace);
            Ok(())
        }
        ItemCommands::Migrate { key } => {
            let outcome = store.migrate_item(namespace, &key).await?;
            println!("{}", describe_migration(&key, outcome));
            Ok(())
        }
        ItemCommands::Status { key } => show_status(store, namespace, key.as_deref()).await,
    }
}

async fn show_status<B: PersistenceBackend>(
    store: &SecureStore<B>,
    namespace: &str,
    key: Option<&str>,
) -> StoreResult<()> {
    println!("Encryption Status");
    println!("=================");
    println!();

    if store.is_confidential() {
        println!("Cipher:         AES-256-GCM");
    } else {
        println!("Cipher:         UNAVAILABLE (values are stored unencrypted)");
    }
    println!("Key derivation: {}", store.key_derivation().name());
    println!("Namespace:      {}", namespace);

    if let Some(key) = key {
        let outcome = store.read_item(namespace, key).await?;
        println!();
        println!("Key '{}': {}", key, describe_read(&outcome));
    }

    Ok(())
}

/// One-line description of how a value was (or wasn't) read
pub fn describe_read(outcome: &ReadOutcome) -> String {
    match outcome {
        ReadOutcome::Missing => "not set".to_string(),
        ReadOutcome::Unreadable => "present but unreadable with the configured secrets".to_string(),
        ReadOutcome::Found { source, .. } => match source {
            ReadSource::Current => "encrypted with the current secret".to_string(),
            ReadSource::Retained(index) => {
                format!("encrypted with retained secret #{} (run 'migrate')", index + 1)
            }
            ReadSource::Unencrypted => "stored UNENCRYPTED".to_string(),
        },
    }
}

fn describe_migration(key: &str, outcome: MigrationOutcome) -> String {
    match outcome {
        MigrationOutcome::Missing => format!("'{}' is not set; nothing to migrate.", key),
        MigrationOutcome::Current => format!("'{}' is already up to date.", key),
        MigrationOutcome::Reencrypted => format!("'{}' re-encrypted with the current secret.", key),
        MigrationOutcome::Unreadable => {
            format!("'{}' could not be read with any configured secret; left as is.", key)
        }
    }
}
