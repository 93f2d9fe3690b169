//! Balance service: cached resolution and spendable-balance math

use dashmap::DashMap;
use tracing::{debug, warn};

use uswap_chains::{fees, registry, BalanceFetchError, BalanceFetcher, GasFee};
use uswap_types::{Asset, Chain};

/// Cache key: unrelated lookups never contend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BalanceKey {
	chain: Chain,
	address: String,
	asset: String,
}

impl BalanceKey {
	fn new(address: &str, asset: &Asset) -> Self {
		Self {
			chain: asset.id.chain,
			address: address.to_string(),
			asset: asset.id.to_string(),
		}
	}
}

/// Cached balance resolution. Entries are replaced wholesale on refresh;
/// a fetch failure leaves the previous entry untouched.
pub struct BalanceService {
	fetcher: BalanceFetcher,
	cache: DashMap<BalanceKey, u128>,
}

impl BalanceService {
	pub fn new(fetcher: BalanceFetcher) -> Self {
		Self {
			fetcher,
			cache: DashMap::new(),
		}
	}

	/// Fetch the balance upstream and replace the cache entry.
	pub async fn refresh(&self, address: &str, asset: &Asset) -> Result<u128, BalanceFetchError> {
		let balance = self.fetcher.fetch(address, asset).await?;
		self.cache.insert(BalanceKey::new(address, asset), balance);
		debug!(asset = %asset.id, balance, "balance refreshed");
		Ok(balance)
	}

	/// Last known balance, without touching the network.
	pub fn cached(&self, address: &str, asset: &Asset) -> Option<u128> {
		self.cache
			.get(&BalanceKey::new(address, asset))
			.map(|entry| *entry)
	}

	/// Cached balance, refreshing on a miss. An upstream failure degrades
	/// to `None` ("unknown balance") instead of propagating.
	pub async fn get(&self, address: &str, asset: &Asset) -> Option<u128> {
		if let Some(balance) = self.cached(address, asset) {
			return Some(balance);
		}
		match self.refresh(address, asset).await {
			Ok(balance) => Some(balance),
			Err(e) => {
				warn!(asset = %asset.id, error = %e, "balance fetch failed");
				None
			},
		}
	}

	/// Spendable balance net of `fee`: the fee is only reserved when the
	/// traded asset is the chain's gas asset, and the result never goes
	/// negative. An unknown balance is zero spendable.
	pub async fn spendable(&self, address: &str, asset: &Asset, fee: &GasFee) -> u128 {
		let balance = self.get(address, asset).await.unwrap_or(0);
		fees::spendable(balance, fee.amount, registry::is_gas_asset(&asset.id))
	}
}
