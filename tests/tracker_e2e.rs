//! End-to-end lifecycle tracking tests against mock providers

mod mocks;

use std::collections::HashMap;
use std::sync::Arc;

use mocks::MockProviderAdapter;
use uswap::{
	AdapterRegistry, MemoryStore, PollMode, ProviderName, ProviderRuntimeConfig,
	TransactionRecord, TransactionStorage, TransactionTracker, TxStatus,
};

fn tracker_with(
	adapter: Arc<MockProviderAdapter>,
) -> (Arc<TransactionTracker>, Arc<MemoryStore>) {
	let mut registry = AdapterRegistry::new();
	registry.register(adapter);

	let mut providers = HashMap::new();
	providers.insert(
		ProviderName::Thorchain,
		ProviderRuntimeConfig::new(ProviderName::Thorchain, "http://mock", 1_000),
	);

	let store = Arc::new(MemoryStore::new());
	let tracker = Arc::new(TransactionTracker::new(
		store.clone(),
		Arc::new(registry),
		providers,
		PollMode::Live,
	));
	(tracker, store)
}

fn broadcast_record(hash: &str) -> TransactionRecord {
	let mut tx = TransactionRecord::new(
		hash,
		"BTC.BTC".parse().unwrap(),
		50_000_000,
		"THOR.RUNE".parse().unwrap(),
		ProviderName::Thorchain,
	);
	tx.status = TxStatus::Pending;
	tx
}

#[tokio::test]
async fn test_full_lifecycle_to_completion() {
	let adapter = Arc::new(
		MockProviderAdapter::new(ProviderName::Thorchain, Vec::new()).with_track_script(vec![
			TxStatus::NotStarted,
			TxStatus::Pending,
			TxStatus::Swapping,
			TxStatus::Completed,
		]),
	);
	let (tracker, store) = tracker_with(adapter.clone());
	tracker.record(broadcast_record("tx1")).await.unwrap();

	for _ in 0..4 {
		tracker.poll_pending().await;
	}
	assert_eq!(adapter.track_calls(), 4);
	let tx = store.get_transaction("tx1").await.unwrap().unwrap();
	assert_eq!(tx.status, TxStatus::Completed);

	// terminal: subsequent sweeps never poll this record again
	tracker.poll_pending().await;
	tracker.poll_pending().await;
	assert_eq!(adapter.track_calls(), 4);
}

#[tokio::test]
async fn test_refunded_is_terminal() {
	let adapter = Arc::new(
		MockProviderAdapter::new(ProviderName::Thorchain, Vec::new())
			.with_track_script(vec![TxStatus::Refunded]),
	);
	let (tracker, store) = tracker_with(adapter.clone());
	tracker.record(broadcast_record("tx1")).await.unwrap();

	tracker.poll_pending().await;
	tracker.poll_pending().await;
	assert_eq!(adapter.track_calls(), 1);
	let tx = store.get_transaction("tx1").await.unwrap().unwrap();
	assert_eq!(tx.status, TxStatus::Refunded);
}

#[tokio::test]
async fn test_records_are_never_deleted() {
	let adapter = Arc::new(
		MockProviderAdapter::new(ProviderName::Thorchain, Vec::new())
			.with_track_script(vec![TxStatus::Completed]),
	);
	let (tracker, store) = tracker_with(adapter.clone());

	tracker.record(broadcast_record("tx1")).await.unwrap();
	tracker.record(broadcast_record("tx2")).await.unwrap();
	tracker.poll_pending().await;

	// both reached terminal status and both are still listed
	// (history is permanent; polling just stops)
	assert_eq!(adapter.track_calls(), 2);
	assert_eq!(store.list_transactions().await.unwrap().len(), 2);
}
