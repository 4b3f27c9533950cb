//! Persistence bridge for singletons restored from storage.
//!
//! The registry only reads through [`PersistenceBridge::try_load`]; writing
//! is left to tooling such as [`SingletonSettings`].

pub mod bridge;
pub mod error;
pub mod file_store;
pub mod format;
pub mod memory_store;
pub mod settings;

pub use bridge::{PersistenceBridge, StorageKey};
pub use error::PersistenceError;
pub use file_store::FileStore;
pub use format::PayloadFormat;
pub use memory_store::MemoryStore;
pub use settings::SingletonSettings;
