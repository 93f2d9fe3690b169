//! Transaction lifecycle tracking
//!
//! Issued swaps are persisted and every non-terminal record is polled on a
//! fixed interval against its provider's status endpoint. Polling for a
//! record stops permanently once it reaches a terminal status, and never
//! resumes. Distinct records are polled independently; there is no
//! ordering guarantee between them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use uswap_adapters::AdapterRegistry;
use uswap_storage::Storage;
use uswap_types::constants::{LIVE_POLL_INTERVAL, SHARED_POLL_INTERVAL};
use uswap_types::{ProviderName, ProviderRuntimeConfig, StorageResult, TransactionRecord};

/// Which tracking surface this tracker serves; the shareable view polls
/// at a slower cadence than live in-app tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
	Live,
	Shared,
}

impl PollMode {
	pub fn interval(&self) -> Duration {
		match self {
			PollMode::Live => LIVE_POLL_INTERVAL,
			PollMode::Shared => SHARED_POLL_INTERVAL,
		}
	}
}

/// Polls pending swap transactions and folds provider status responses
/// into the persisted records.
pub struct TransactionTracker {
	storage: Arc<dyn Storage>,
	registry: Arc<AdapterRegistry>,
	providers: HashMap<ProviderName, ProviderRuntimeConfig>,
	poll_interval: Duration,
}

impl TransactionTracker {
	pub fn new(
		storage: Arc<dyn Storage>,
		registry: Arc<AdapterRegistry>,
		providers: HashMap<ProviderName, ProviderRuntimeConfig>,
		mode: PollMode,
	) -> Self {
		Self {
			storage,
			registry,
			providers,
			poll_interval: mode.interval(),
		}
	}

	/// Record a freshly broadcast swap. First write wins; records are
	/// never deleted.
	pub async fn record(&self, tx: TransactionRecord) -> StorageResult<()> {
		info!(hash = %tx.hash, provider = %tx.provider, "recording swap transaction");
		self.storage.add_transaction(tx).await
	}

	/// Start the polling loop. The returned handle can be aborted to stop
	/// tracking (individual records also stop on their own at terminal
	/// status).
	pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let tracker = Arc::clone(self);
		tokio::spawn(async move {
			let mut ticker = interval(tracker.poll_interval);
			loop {
				ticker.tick().await;
				tracker.poll_pending().await;
			}
		})
	}

	/// One polling sweep over every non-terminal record.
	pub async fn poll_pending(&self) {
		let transactions = match self.storage.list_transactions().await {
			Ok(transactions) => transactions,
			Err(e) => {
				warn!(error = %e, "failed to list transactions for polling");
				return;
			},
		};

		for tx in transactions {
			if tx.status.is_terminal() {
				continue;
			}
			self.poll_one(tx).await;
		}
	}

	async fn poll_one(&self, mut tx: TransactionRecord) {
		let adapter = match self.registry.get(tx.provider) {
			Some(adapter) => adapter,
			None => {
				warn!(provider = %tx.provider, "no adapter registered for tracking");
				return;
			},
		};
		let config = match self.providers.get(&tx.provider.adapter_key()) {
			Some(config) => config.clone(),
			None => {
				warn!(provider = %tx.provider, "no provider config for tracking");
				return;
			},
		};

		let params = tx.track_params();
		match adapter.track(&params, &config).await {
			Ok(response) => {
				let previous = tx.status;
				tx.apply_track_response(&response);

				if tx.status != previous {
					info!(
						hash = %tx.hash,
						from = ?previous,
						to = ?tx.status,
						"transaction status changed"
					);
				} else {
					debug!(hash = %tx.hash, status = ?tx.status, "transaction still in flight");
				}

				if let Err(e) = self.storage.update_transaction(tx).await {
					warn!(error = %e, "failed to persist transaction update");
				}
			},
			Err(e) => {
				// one failed poll is retried at the next tick
				warn!(hash = %tx.hash, error = %e.user_message(), "status poll failed");
			},
		}
	}
}
