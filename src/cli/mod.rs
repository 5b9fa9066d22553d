//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the store.

pub mod config;
pub mod item;
pub mod secret;

pub use config::{handle_config_command, ConfigCommands};
pub use item::{handle_item_command, ItemCommands};
pub use secret::{fallback_secrets, resolve_secret};
