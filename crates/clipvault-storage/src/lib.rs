//! # ClipVault Storage
//!
//! Local durable key-value persistence. The security core depends on a
//! store exposing get/set/remove by string key with JSON values, tolerating
//! missing keys and malformed JSON without ever crashing.

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{LocalStore, LocalStoreExt};
