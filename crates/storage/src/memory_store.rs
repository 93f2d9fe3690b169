//! In-memory storage implementation using DashMap

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use preference_cell::PreferenceCell;

use crate::traits::{PreferenceStorage, Storage, StorageError, StorageResult, TransactionStorage};
use uswap_types::{SwapPreferences, TransactionRecord};

/// In-memory store for transaction records and preferences. Entries are
/// replaced wholesale on update; concurrent readers never observe a
/// partially written record.
#[derive(Clone, Default)]
pub struct MemoryStore {
	transactions: Arc<DashMap<String, TransactionRecord>>,
	preferences: Arc<PreferenceCell>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored transactions.
	pub fn transaction_count(&self) -> usize {
		self.transactions.len()
	}
}

#[async_trait]
impl TransactionStorage for MemoryStore {
	async fn add_transaction(&self, tx: TransactionRecord) -> StorageResult<()> {
		// first write wins; records are never re-created
		self.transactions.entry(tx.hash.clone()).or_insert(tx);
		Ok(())
	}

	async fn get_transaction(&self, hash: &str) -> StorageResult<Option<TransactionRecord>> {
		Ok(self.transactions.get(hash).map(|entry| entry.clone()))
	}

	async fn update_transaction(&self, tx: TransactionRecord) -> StorageResult<()> {
		match self.transactions.get_mut(&tx.hash) {
			Some(mut entry) => {
				*entry = tx;
				Ok(())
			},
			None => Err(StorageError::NotFound { id: tx.hash }),
		}
	}

	async fn list_transactions(&self) -> StorageResult<Vec<TransactionRecord>> {
		let mut all: Vec<TransactionRecord> =
			self.transactions.iter().map(|entry| entry.clone()).collect();
		all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(all)
	}

	async fn pending_transactions(&self) -> StorageResult<Vec<TransactionRecord>> {
		Ok(self
			.transactions
			.iter()
			.filter(|entry| entry.status.is_pending())
			.map(|entry| entry.clone())
			.collect())
	}
}

#[async_trait]
impl PreferenceStorage for MemoryStore {
	async fn load_preferences(&self) -> StorageResult<Option<SwapPreferences>> {
		Ok(self.preferences.load())
	}

	async fn save_preferences(&self, preferences: SwapPreferences) -> StorageResult<()> {
		self.preferences.store(preferences);
		Ok(())
	}
}

#[async_trait]
impl Storage for MemoryStore {}

/// Atomic replace-on-write cell for the preference blob.
mod preference_cell {
	use std::sync::RwLock;

	use uswap_types::SwapPreferences;

	#[derive(Default)]
	pub struct PreferenceCell {
		inner: RwLock<Option<SwapPreferences>>,
	}

	impl PreferenceCell {
		pub fn load(&self) -> Option<SwapPreferences> {
			self.inner.read().ok().and_then(|guard| guard.clone())
		}

		pub fn store(&self, preferences: SwapPreferences) {
			if let Ok(mut guard) = self.inner.write() {
				*guard = Some(preferences);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use uswap_types::{AssetId, Chain, ProviderName, TxStatus};

	fn record(hash: &str, status: TxStatus) -> TransactionRecord {
		let mut tx = TransactionRecord::new(
			hash,
			AssetId::new(Chain::Btc, "BTC"),
			50_000_000,
			AssetId::new(Chain::Thor, "RUNE"),
			ProviderName::Thorchain,
		);
		tx.status = status;
		tx
	}

	#[tokio::test]
	async fn test_add_is_first_write_wins() {
		let store = MemoryStore::new();
		store.add_transaction(record("a", TxStatus::Pending)).await.unwrap();
		store.add_transaction(record("a", TxStatus::Completed)).await.unwrap();

		let got = store.get_transaction("a").await.unwrap().unwrap();
		assert_eq!(got.status, TxStatus::Pending);
		assert_eq!(store.transaction_count(), 1);
	}

	#[tokio::test]
	async fn test_update_replaces_wholesale() {
		let store = MemoryStore::new();
		store.add_transaction(record("a", TxStatus::Pending)).await.unwrap();

		let mut updated = record("a", TxStatus::Completed);
		updated.to_amount = Some(1_000);
		store.update_transaction(updated).await.unwrap();

		let got = store.get_transaction("a").await.unwrap().unwrap();
		assert_eq!(got.status, TxStatus::Completed);
		assert_eq!(got.to_amount, Some(1_000));
	}

	#[tokio::test]
	async fn test_update_unknown_hash_fails() {
		let store = MemoryStore::new();
		let err = store
			.update_transaction(record("missing", TxStatus::Pending))
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::NotFound { .. }));
	}

	#[tokio::test]
	async fn test_pending_filter() {
		let store = MemoryStore::new();
		store.add_transaction(record("a", TxStatus::Pending)).await.unwrap();
		store.add_transaction(record("b", TxStatus::Completed)).await.unwrap();
		store.add_transaction(record("c", TxStatus::Swapping)).await.unwrap();

		let pending = store.pending_transactions().await.unwrap();
		let mut hashes: Vec<_> = pending.iter().map(|t| t.hash.as_str()).collect();
		hashes.sort();
		assert_eq!(hashes, vec!["a", "c"]);
	}

	#[tokio::test]
	async fn test_preferences_round_trip() {
		let store = MemoryStore::new();
		assert!(store.load_preferences().await.unwrap().is_none());

		let mut prefs = SwapPreferences::default();
		prefs.slippage_bps = 300;
		store.save_preferences(prefs.clone()).await.unwrap();
		assert_eq!(store.load_preferences().await.unwrap(), Some(prefs));
	}
}
