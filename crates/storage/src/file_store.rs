//! File-backed storage with schema versioning
//!
//! State is one JSON blob per store, loaded on init and rewritten in full
//! on every mutation via write-temp-then-rename, so readers of the file
//! never observe a partial write. Blobs written under a different schema
//! version are discarded on load; forward migration is the embedding
//! application's concern.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::traits::{PreferenceStorage, Storage, StorageError, StorageResult, TransactionStorage};
use uswap_types::storage::SCHEMA_VERSION;
use uswap_types::{SwapPreferences, TransactionRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedState {
	schema_version: u32,
	transactions: Vec<TransactionRecord>,
	preferences: Option<SwapPreferences>,
}

impl Default for PersistedState {
	fn default() -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			transactions: Vec::new(),
			preferences: None,
		}
	}
}

/// Durable local store backed by a single JSON file.
pub struct FileStore {
	path: PathBuf,
	state: RwLock<PersistedState>,
}

impl FileStore {
	/// Open (or create) a store at `path`, loading any persisted state
	/// written under the current schema version.
	pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
		let path = path.into();
		let state = Self::load_state(&path)?;
		Ok(Self {
			path,
			state: RwLock::new(state),
		})
	}

	fn load_state(path: &Path) -> StorageResult<PersistedState> {
		if !path.exists() {
			return Ok(PersistedState::default());
		}

		let raw = std::fs::read_to_string(path).map_err(|e| StorageError::Io {
			message: e.to_string(),
		})?;

		let state: PersistedState =
			serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
				message: e.to_string(),
			})?;

		if state.schema_version != SCHEMA_VERSION {
			warn!(
				found = state.schema_version,
				expected = SCHEMA_VERSION,
				"discarding persisted state with mismatched schema version"
			);
			return Ok(PersistedState::default());
		}

		debug!(
			transactions = state.transactions.len(),
			"loaded persisted state"
		);
		Ok(state)
	}

	/// Serialize the full state and atomically replace the file.
	fn persist(&self, state: &PersistedState) -> StorageResult<()> {
		let raw = serde_json::to_string_pretty(state).map_err(|e| StorageError::Serialization {
			message: e.to_string(),
		})?;

		let tmp = self.path.with_extension("tmp");
		std::fs::write(&tmp, raw).map_err(|e| StorageError::Io {
			message: e.to_string(),
		})?;
		std::fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io {
			message: e.to_string(),
		})?;
		Ok(())
	}

	fn mutate<F>(&self, f: F) -> StorageResult<()>
	where
		F: FnOnce(&mut PersistedState) -> StorageResult<()>,
	{
		let mut guard = self.state.write().map_err(|_| StorageError::Operation {
			message: "state lock poisoned".to_string(),
		})?;
		f(&mut guard)?;
		self.persist(&guard)
	}

	fn read<T, F>(&self, f: F) -> StorageResult<T>
	where
		F: FnOnce(&PersistedState) -> T,
	{
		let guard = self.state.read().map_err(|_| StorageError::Operation {
			message: "state lock poisoned".to_string(),
		})?;
		Ok(f(&guard))
	}
}

#[async_trait]
impl TransactionStorage for FileStore {
	async fn add_transaction(&self, tx: TransactionRecord) -> StorageResult<()> {
		self.mutate(|state| {
			if state.transactions.iter().any(|t| t.hash == tx.hash) {
				return Ok(());
			}
			state.transactions.push(tx);
			Ok(())
		})
	}

	async fn get_transaction(&self, hash: &str) -> StorageResult<Option<TransactionRecord>> {
		self.read(|state| state.transactions.iter().find(|t| t.hash == hash).cloned())
	}

	async fn update_transaction(&self, tx: TransactionRecord) -> StorageResult<()> {
		self.mutate(|state| {
			match state.transactions.iter_mut().find(|t| t.hash == tx.hash) {
				Some(existing) => {
					*existing = tx;
					Ok(())
				},
				None => Err(StorageError::NotFound { id: tx.hash }),
			}
		})
	}

	async fn list_transactions(&self) -> StorageResult<Vec<TransactionRecord>> {
		self.read(|state| {
			let mut all = state.transactions.clone();
			all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
			all
		})
	}

	async fn pending_transactions(&self) -> StorageResult<Vec<TransactionRecord>> {
		self.read(|state| {
			state
				.transactions
				.iter()
				.filter(|t| t.status.is_pending())
				.cloned()
				.collect()
		})
	}
}

#[async_trait]
impl PreferenceStorage for FileStore {
	async fn load_preferences(&self) -> StorageResult<Option<SwapPreferences>> {
		self.read(|state| state.preferences.clone())
	}

	async fn save_preferences(&self, preferences: SwapPreferences) -> StorageResult<()> {
		self.mutate(|state| {
			state.preferences = Some(preferences);
			Ok(())
		})
	}
}

#[async_trait]
impl Storage for FileStore {}

#[cfg(test)]
mod tests {
	use super::*;
	use uswap_types::{AssetId, Chain, ProviderName, TxStatus};

	fn record(hash: &str) -> TransactionRecord {
		TransactionRecord::new(
			hash,
			AssetId::new(Chain::Btc, "BTC"),
			50_000_000,
			AssetId::new(Chain::Thor, "RUNE"),
			ProviderName::Thorchain,
		)
	}

	#[tokio::test]
	async fn test_state_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");

		{
			let store = FileStore::open(&path).unwrap();
			store.add_transaction(record("a")).await.unwrap();
			store
				.save_preferences(SwapPreferences::default())
				.await
				.unwrap();
		}

		let reopened = FileStore::open(&path).unwrap();
		assert!(reopened.get_transaction("a").await.unwrap().is_some());
		assert!(reopened.load_preferences().await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_schema_version_mismatch_discards_state() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");

		{
			let store = FileStore::open(&path).unwrap();
			store.add_transaction(record("a")).await.unwrap();
		}

		// rewrite the blob under an older schema version
		let raw = std::fs::read_to_string(&path).unwrap();
		let rewritten = raw.replacen(
			&format!("\"schema_version\": {}", SCHEMA_VERSION),
			"\"schema_version\": 1",
			1,
		);
		assert_ne!(raw, rewritten);
		std::fs::write(&path, rewritten).unwrap();

		let reopened = FileStore::open(&path).unwrap();
		assert!(reopened.get_transaction("a").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_update_persists_status_change() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");

		let store = FileStore::open(&path).unwrap();
		store.add_transaction(record("a")).await.unwrap();

		let mut tx = store.get_transaction("a").await.unwrap().unwrap();
		tx.status = TxStatus::Completed;
		store.update_transaction(tx).await.unwrap();

		let reopened = FileStore::open(&path).unwrap();
		let got = reopened.get_transaction("a").await.unwrap().unwrap();
		assert_eq!(got.status, TxStatus::Completed);
	}

	#[tokio::test]
	async fn test_records_are_never_deleted_by_adds() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");

		let store = FileStore::open(&path).unwrap();
		store.add_transaction(record("a")).await.unwrap();
		store.add_transaction(record("b")).await.unwrap();
		store.add_transaction(record("a")).await.unwrap();

		assert_eq!(store.list_transactions().await.unwrap().len(), 2);
	}
}
