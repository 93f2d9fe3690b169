//! Quote aggregation: fan-out, ranking and selection state

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use uswap_adapters::AdapterRegistry;
use uswap_types::{
	Asset, AssetId, ProviderName, ProviderRuntimeConfig, QuoteParams, Route, RouteSet,
};

/// Service fanning one quote request out to every eligible provider and
/// ranking the merged result.
pub struct AggregatorService {
	/// Providers in query order; this order is the ranking tie-break
	providers: Vec<(ProviderName, ProviderRuntimeConfig)>,
	registry: Arc<AdapterRegistry>,
	global_timeout_ms: u64,
}

impl AggregatorService {
	pub fn new(
		providers: Vec<(ProviderName, ProviderRuntimeConfig)>,
		registry: Arc<AdapterRegistry>,
		global_timeout_ms: u64,
	) -> Self {
		Self {
			providers,
			registry,
			global_timeout_ms,
		}
	}

	/// Providers this request may query: the single designated provider in
	/// restricted mode, otherwise the configured providers intersected
	/// with both assets' provider sets (when catalog entries are known).
	pub fn eligible_providers(
		&self,
		params: &QuoteParams,
		sell: Option<&Asset>,
		buy: Option<&Asset>,
	) -> Vec<(ProviderName, ProviderRuntimeConfig)> {
		self.providers
			.iter()
			.filter(|(name, _)| match params.restrict_to {
				Some(only) => *name == only,
				None => {
					let sell_ok = sell.map(|a| a.routable_by(*name)).unwrap_or(true);
					let buy_ok = buy.map(|a| a.routable_by(*name)).unwrap_or(true);
					sell_ok && buy_ok
				},
			})
			.cloned()
			.collect()
	}

	/// Merged asset catalog across every configured provider:
	/// de-duplicated by identifier, provider sets unioned. A provider
	/// without a catalog contributes nothing.
	pub async fn token_catalog(&self) -> Vec<Asset> {
		let tasks = self.providers.iter().map(|(name, config)| {
			let name = *name;
			let config = config.clone();
			let registry = Arc::clone(&self.registry);

			tokio::spawn(async move {
				let adapter = registry.get(name)?;
				match adapter.token_list(&config).await {
					Ok(assets) => Some((name, assets)),
					Err(e) => {
						debug!(provider = %name, error = %e, "no token catalog");
						None
					},
				}
			})
		});

		let lists: Vec<(ProviderName, Vec<Asset>)> = join_all(tasks)
			.await
			.into_iter()
			.filter_map(|r| r.ok().flatten())
			.collect();

		uswap_types::providers::merge_token_lists(lists)
	}

	/// Current inbound deposit addresses for `provider`.
	pub async fn inbound_addresses(
		&self,
		provider: ProviderName,
	) -> Option<Vec<uswap_types::InboundAddress>> {
		let config = self
			.providers
			.iter()
			.find(|(name, _)| *name == provider)
			.map(|(_, config)| config.clone())?;
		let adapter = self.registry.get(provider)?;

		match adapter.inbound_addresses(&config).await {
			Ok(addresses) => Some(addresses),
			Err(e) => {
				warn!(provider = %provider, error = %e.user_message(), "inbound addresses failed");
				None
			},
		}
	}

	/// Fetch routes concurrently from every eligible provider.
	///
	/// A provider erroring or timing out is logged and dropped; healthy
	/// providers still contribute. The merged list is ranked by expected
	/// buy amount descending, ties kept in query order. A zero sell
	/// amount short-circuits to no query at all.
	pub async fn fetch_routes(
		&self,
		params: &QuoteParams,
		sell: Option<&Asset>,
		buy: Option<&Asset>,
	) -> Vec<Route> {
		if params.sell_amount == 0 {
			return Vec::new();
		}

		let eligible = self.eligible_providers(params, sell, buy);
		info!(
			sell = %params.sell_asset,
			buy = %params.buy_asset,
			providers = eligible.len(),
			"fetching quotes"
		);

		let tasks = eligible.into_iter().map(|(name, config)| {
			let params = params.clone();
			let registry = Arc::clone(&self.registry);

			tokio::spawn(async move {
				let adapter = match registry.get(name) {
					Some(adapter) => adapter,
					None => {
						warn!(provider = %name, "no adapter registered");
						return None;
					},
				};

				let per_provider = Duration::from_millis(config.timeout_ms);
				match timeout(per_provider, adapter.fetch_routes(&params, &config)).await {
					Ok(Ok(routes)) => {
						debug!(provider = %name, routes = routes.len(), "provider quoted");
						Some(routes)
					},
					Ok(Err(e)) => {
						warn!(provider = %name, error = %e.user_message(), "provider quote failed");
						None
					},
					Err(_) => {
						warn!(provider = %name, timeout_ms = config.timeout_ms, "provider timed out");
						None
					},
				}
			})
		});

		let joined = match timeout(
			Duration::from_millis(self.global_timeout_ms),
			join_all(tasks),
		)
		.await
		{
			Ok(results) => results,
			Err(_) => {
				warn!(
					timeout_ms = self.global_timeout_ms,
					"global aggregation timeout reached"
				);
				Vec::new()
			},
		};

		let routes: Vec<Route> = joined
			.into_iter()
			.filter_map(|r| r.ok().flatten())
			.flatten()
			.collect();

		info!(routes = routes.len(), "quote aggregation completed");
		rank_routes(routes)
	}
}

/// Rank routes best-price-first.
///
/// Primary key: expected buy amount descending. Tie-break: the order
/// providers were queried in, made explicit through the enumeration index
/// so equal-amount routes keep a deterministic order.
pub fn rank_routes(routes: Vec<Route>) -> Vec<Route> {
	let mut indexed: Vec<(usize, Route)> = routes.into_iter().enumerate().collect();
	indexed.sort_by(|(ia, a), (ib, b)| {
		b.expected_buy_amount
			.cmp(&a.expected_buy_amount)
			.then(ia.cmp(ib))
	});
	indexed.into_iter().map(|(_, route)| route).collect()
}

/// The input identity of a quote query; superseding a key cancels the
/// in-flight query for the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteKey {
	pub sell_asset: AssetId,
	pub buy_asset: AssetId,
	pub sell_amount: u128,
	pub slippage_bps: u16,
}

impl From<&QuoteParams> for QuoteKey {
	fn from(params: &QuoteParams) -> Self {
		Self {
			sell_asset: params.sell_asset.clone(),
			buy_asset: params.buy_asset.clone(),
			sell_amount: params.sell_amount,
			slippage_bps: params.slippage_bps,
		}
	}
}

struct InFlight {
	key: QuoteKey,
	abort: AbortHandle,
}

/// Stateful quote session: holds the active ranked route set and the
/// user's selection, and cancels an in-flight query when a request with a
/// different input identity supersedes it.
pub struct QuoteSession {
	aggregator: Arc<AggregatorService>,
	in_flight: Mutex<Option<InFlight>>,
	active: RwLock<RouteSet>,
}

impl QuoteSession {
	pub fn new(aggregator: Arc<AggregatorService>) -> Self {
		Self {
			aggregator,
			in_flight: Mutex::new(None),
			active: RwLock::new(RouteSet::default()),
		}
	}

	/// Run a quote query, replacing the active route set on completion.
	/// Selection resets to the best-price route.
	pub async fn request(
		&self,
		params: QuoteParams,
		sell: Option<Asset>,
		buy: Option<Asset>,
	) -> RouteSet {
		let key = QuoteKey::from(&params);

		if params.sell_amount == 0 {
			let mut active = self.active.write().await;
			*active = RouteSet::default();
			let mut in_flight = self.in_flight.lock().await;
			if let Some(old) = in_flight.take() {
				old.abort.abort();
			}
			return active.clone();
		}

		let aggregator = Arc::clone(&self.aggregator);
		let task_params = params.clone();
		let handle = tokio::spawn(async move {
			aggregator
				.fetch_routes(&task_params, sell.as_ref(), buy.as_ref())
				.await
		});

		{
			let mut in_flight = self.in_flight.lock().await;
			if let Some(old) = in_flight.take() {
				if old.key != key {
					debug!("superseding in-flight quote query");
				}
				old.abort.abort();
			}
			*in_flight = Some(InFlight {
				key: key.clone(),
				abort: handle.abort_handle(),
			});
		}

		match handle.await {
			Ok(routes) => {
				let set = RouteSet::new(routes);
				{
					let mut active = self.active.write().await;
					*active = set.clone();
				}
				let mut in_flight = self.in_flight.lock().await;
				if let Some(current) = in_flight.as_ref() {
					if current.key == key {
						*in_flight = None;
					}
				}
				set
			},
			// aborted by a superseding request; keep whatever is active
			Err(_) => self.active.read().await.clone(),
		}
	}

	/// The active ranked routes and selection.
	pub async fn active(&self) -> RouteSet {
		self.active.read().await.clone()
	}

	/// Re-point the selection at another returned route, without
	/// re-querying.
	pub async fn select(&self, index: usize) -> RouteSet {
		let mut active = self.active.write().await;
		active.select(index);
		active.clone()
	}
}
