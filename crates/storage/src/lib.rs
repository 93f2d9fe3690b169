//! uswap Storage
//!
//! Pluggable persistence for transaction history and swap preferences:
//! an in-memory store for tests and ephemeral sessions, and a file-backed
//! store with schema versioning for durable local state.

pub mod file_store;
pub mod memory_store;
pub mod traits;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use traits::{PreferenceStorage, Storage, StorageError, StorageResult, TransactionStorage};
