//! uswap Core
//!
//! Multi-chain swap orchestration: quote aggregation and route selection,
//! balance and fee resolution per chain family, a chain-agnostic
//! transaction intent with one lowering path per family, and lifecycle
//! tracking for broadcast swaps.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

// Core domain types - the most commonly used types
pub use uswap_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	Account,
	Asset,
	AssetId,
	Chain,
	ChainFamily,
	InboundAddress,
	ProviderError,
	ProviderName,
	ProviderRuntimeConfig,
	QuoteParams,
	Route,
	RouteSet,
	TrackParams,
	TrackResponse,
	TransactionLeg,
	TransactionRecord,
	TxStatus,
	WalletProvider,
};

// Chain-family layer
pub use uswap_chains::{
	apply_surcharge, spendable, BalanceFetchError, BalanceFetcher, ChainEndpoints, EncodedTx,
	GasFee, InsufficientAllowanceError, LoweringContext, MessageError, SimulationError,
	SwapMessage, UnsupportedNetworkError,
};

// Service layer
pub use uswap_service::{
	connect_all, AggregatorService, BalanceService, ConnectError, ConnectionTimeoutError,
	PendingApproval, PollMode, QuoteSession, Simulation, SimulationService, TransactionTracker,
	WalletConnector,
};

// Storage layer
pub use uswap_storage::{
	FileStore, MemoryStore, PreferenceStorage, Storage, StorageError, TransactionStorage,
};

// Adapters
pub use uswap_adapters::{AdapterRegistry, ChainflipAdapter, MayaAdapter, ThorchainAdapter};

// Config
pub use uswap_config::{load_config, LogFormat, Settings};

// Module aliases for qualified access
pub mod types {
	pub use uswap_types::*;
}

pub mod chains {
	pub use uswap_chains::*;
}

pub mod service {
	pub use uswap_service::*;
}

pub mod storage {
	pub use uswap_storage::*;
}

pub mod config {
	pub use uswap_config::*;
}

pub mod adapters {
	pub use uswap_adapters::*;
}

/// Initialize tracing from the logging settings. Call once per process.
pub fn init_tracing(settings: &Settings) {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

	match settings.logging.format {
		LogFormat::Json => {
			tracing_subscriber::fmt()
				.json()
				.with_env_filter(env_filter)
				.init();
		},
		LogFormat::Pretty => {
			tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter)
				.init();
		},
		LogFormat::Compact => {
			tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter)
				.init();
		},
	}
}

/// The wired-up orchestration core: every service sharing one settings
/// source, adapter registry and storage backend.
pub struct SwapStack {
	pub settings: Settings,
	pub storage: Arc<dyn Storage>,
	pub registry: Arc<AdapterRegistry>,
	pub aggregator: Arc<AggregatorService>,
	pub quotes: Arc<QuoteSession>,
	pub balances: Arc<BalanceService>,
	pub simulation: Arc<SimulationService>,
	pub tracker: Arc<TransactionTracker>,
}

impl SwapStack {
	/// Quote params for a swap, carrying the configured slippage default
	/// and affiliate parameters.
	pub fn quote_params(&self, sell_asset: AssetId, buy_asset: AssetId, amount: u128) -> QuoteParams {
		let mut params = QuoteParams::new(sell_asset, buy_asset, amount);
		if let Some(affiliate) = &self.settings.affiliate {
			params.affiliate = Some(uswap_types::Affiliate {
				address: affiliate.address.clone(),
				bps: affiliate.bps,
			});
		}
		params
	}
}

/// Builder wiring storage, adapters and settings into a [`SwapStack`].
pub struct SwapStackBuilder<S = MemoryStore>
where
	S: Storage + 'static,
{
	settings: Option<Settings>,
	storage: S,
	registry: Option<AdapterRegistry>,
	poll_mode: PollMode,
}

impl SwapStackBuilder<MemoryStore> {
	/// Builder with in-memory storage.
	pub fn new() -> Self {
		Self::with_storage(MemoryStore::new())
	}
}

impl Default for SwapStackBuilder<MemoryStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S> SwapStackBuilder<S>
where
	S: Storage + 'static,
{
	/// Builder with the provided storage backend.
	pub fn with_storage(storage: S) -> Self {
		Self {
			settings: None,
			storage,
			registry: None,
			poll_mode: PollMode::Live,
		}
	}

	/// Use explicit settings instead of `config/config` + environment.
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Replace the default adapter registry (e.g. to add a custom
	/// provider adapter).
	pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Track at the shareable-view cadence instead of live cadence.
	pub fn with_poll_mode(mut self, mode: PollMode) -> Self {
		self.poll_mode = mode;
		self
	}

	/// Wire everything up.
	pub fn build(self) -> SwapStack {
		// .env first so it can feed the config environment overrides
		dotenvy::dotenv().ok();

		let settings = self
			.settings
			.unwrap_or_else(|| load_config().unwrap_or_default());

		let providers = settings.enabled_providers();
		info!(providers = providers.len(), "configuring swap stack");

		let registry = Arc::new(self.registry.unwrap_or_else(AdapterRegistry::with_defaults));

		let mut endpoints = ChainEndpoints::new();
		for (chain, chain_settings) in &settings.chains {
			endpoints = endpoints.with_endpoint(
				*chain,
				chain_settings.endpoint.clone(),
				chain_settings.api_key.clone(),
			);
		}

		let aggregator = Arc::new(AggregatorService::new(
			providers.clone(),
			Arc::clone(&registry),
			settings.timeouts.global_ms,
		));

		let provider_configs: HashMap<ProviderName, ProviderRuntimeConfig> =
			providers.into_iter().collect();

		let storage: Arc<dyn Storage> = Arc::new(self.storage);
		let tracker = Arc::new(TransactionTracker::new(
			Arc::clone(&storage),
			Arc::clone(&registry),
			provider_configs,
			self.poll_mode,
		));

		SwapStack {
			quotes: Arc::new(QuoteSession::new(Arc::clone(&aggregator))),
			aggregator,
			balances: Arc::new(BalanceService::new(BalanceFetcher::new(endpoints.clone()))),
			simulation: Arc::new(SimulationService::new(endpoints)),
			tracker,
			registry,
			storage,
			settings,
		}
	}
}
