//! Storage traits for pluggable storage implementations

// Re-export the storage traits from the types crate
pub use uswap_types::storage::{
	PreferenceStorage, Storage, StorageError, StorageResult, TransactionStorage,
};
