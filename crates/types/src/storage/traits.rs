//! Storage traits for transaction history and swap preferences

use async_trait::async_trait;
use thiserror::Error;

use super::SwapPreferences;
use crate::transactions::TransactionRecord;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("item not found: {id}")]
	NotFound { id: String },
	#[error("I/O error: {message}")]
	Io { message: String },
	#[error("serialization error: {message}")]
	Serialization { message: String },
	#[error("storage operation failed: {message}")]
	Operation { message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted swap transaction history.
///
/// Records are append-then-update: once added they are never deleted, and
/// updates replace the whole record (replace-on-write, no partial in-place
/// mutation visible to concurrent readers).
#[async_trait]
pub trait TransactionStorage: Send + Sync {
	/// Add a transaction. Adding an existing hash is a no-op (the original
	/// record wins).
	async fn add_transaction(&self, tx: TransactionRecord) -> StorageResult<()>;

	/// Get a transaction by hash
	async fn get_transaction(&self, hash: &str) -> StorageResult<Option<TransactionRecord>>;

	/// Replace an existing transaction wholesale
	async fn update_transaction(&self, tx: TransactionRecord) -> StorageResult<()>;

	/// All transactions, newest first
	async fn list_transactions(&self) -> StorageResult<Vec<TransactionRecord>>;

	/// Transactions whose status is still in flight
	async fn pending_transactions(&self) -> StorageResult<Vec<TransactionRecord>>;
}

/// Persisted swap preference blob.
#[async_trait]
pub trait PreferenceStorage: Send + Sync {
	/// Load preferences; `None` when nothing usable is persisted
	async fn load_preferences(&self) -> StorageResult<Option<SwapPreferences>>;

	/// Persist preferences (replace-on-write)
	async fn save_preferences(&self, preferences: SwapPreferences) -> StorageResult<()>;
}

/// Combined storage surface consumed by the service layer.
#[async_trait]
pub trait Storage: TransactionStorage + PreferenceStorage {
	/// Health check for the storage backend
	async fn health_check(&self) -> StorageResult<bool> {
		Ok(true)
	}
}
