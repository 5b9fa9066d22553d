//! Configuration module for the secure store
//!
//! This module provides:
//! - `StoreConfig`, the explicit construction-time configuration of a store
//! - CLI path resolution
//! - CLI settings persistence

pub mod paths;
pub mod settings;
pub mod store;

pub use paths::StorePaths;
pub use settings::Settings;
pub use store::StoreConfig;
