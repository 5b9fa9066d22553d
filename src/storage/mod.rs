//! Storage layer for the secure store
//!
//! Defines the persistence backend contract, how namespaced keys are
//! composed for it, and the two bundled backends: an in-memory map and a
//! single JSON file with atomic writes.

pub mod backend;
pub mod file;
pub mod file_io;
pub mod key;
pub mod memory;

pub use backend::PersistenceBackend;
pub use file::JsonFileBackend;
pub use file_io::{read_json, write_json_atomic};
pub use key::StorageKey;
pub use memory::MemoryBackend;
