//! Balance resolution: one entry point dispatching to the right
//! chain-family fetcher, output normalized to 8-decimal base units

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::errors::BalanceFetchError;
use crate::registry;
use crate::{cosmos, evm, tron, utxo, xrp};
use uswap_types::{Asset, Chain, ChainFamily};

/// Per-chain endpoint overrides. Defaults come from the registry; settings
/// can replace any entry (e.g. a keyed RPC or explorer).
#[derive(Debug, Clone, Default)]
pub struct ChainEndpoints {
	overrides: HashMap<Chain, Endpoint>,
}

#[derive(Debug, Clone)]
struct Endpoint {
	url: String,
	api_key: Option<String>,
}

impl ChainEndpoints {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_endpoint(
		mut self,
		chain: Chain,
		url: impl Into<String>,
		api_key: Option<String>,
	) -> Self {
		self.overrides.insert(
			chain,
			Endpoint {
				url: url.into(),
				api_key,
			},
		);
		self
	}

	/// Endpoint URL for a chain, falling back to the registry default.
	pub fn url(&self, chain: Chain) -> String {
		match self.overrides.get(&chain) {
			Some(endpoint) => endpoint.url.clone(),
			None => registry::properties(chain).endpoint.to_string(),
		}
	}

	pub fn api_key(&self, chain: Chain) -> Option<String> {
		self.overrides.get(&chain).and_then(|e| e.api_key.clone())
	}
}

/// Resolves on-chain balances across every supported chain family.
#[derive(Debug, Clone)]
pub struct BalanceFetcher {
	client: reqwest::Client,
	endpoints: ChainEndpoints,
}

impl BalanceFetcher {
	pub fn new(endpoints: ChainEndpoints) -> Self {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(10))
			.build()
			.unwrap_or_default();
		Self { client, endpoints }
	}

	/// Balance of `asset` held by `address`, in 8-decimal base units.
	///
	/// Upstream failures propagate as typed errors. No retries here;
	/// periodic refetch is the caller's concern.
	pub async fn fetch(&self, address: &str, asset: &Asset) -> Result<u128, BalanceFetchError> {
		let chain = asset.id.chain;
		let endpoint = self.endpoints.url(chain);
		debug!(%chain, address, asset = %asset.id, "resolving balance");

		match chain.family() {
			ChainFamily::Evm => self.fetch_evm(&endpoint, address, asset).await,
			ChainFamily::Utxo => {
				utxo::fetch_balance(
					&self.client,
					chain,
					&endpoint,
					self.endpoints.api_key(chain).as_deref(),
					address,
				)
				.await
			},
			ChainFamily::Cosmos => {
				cosmos::fetch_balance(&self.client, chain, &endpoint, address).await
			},
			ChainFamily::Xrp => xrp::fetch_balance(&self.client, &endpoint, address).await,
			ChainFamily::Tron => {
				tron::fetch_balance(
					&self.client,
					&endpoint,
					address,
					asset.id.contract.as_deref(),
					u32::from(asset.decimals),
				)
				.await
			},
		}
	}

	async fn fetch_evm(
		&self,
		endpoint: &str,
		address: &str,
		asset: &Asset,
	) -> Result<u128, BalanceFetchError> {
		let rpc = evm::EvmRpcClient::new(endpoint);

		match &asset.id.contract {
			None => {
				let wei = rpc.get_balance(address).await?;
				let decimals = registry::properties(asset.id.chain).decimals;
				Ok(evm::normalize_amount(wei, decimals))
			},
			Some(contract) => {
				let token = evm::parse_address(contract)?;
				let owner = evm::parse_address(address)?;
				let raw = rpc.erc20_balance(token, owner).await?;
				let decimals = rpc.erc20_decimals(token).await?;
				Ok(evm::normalize_amount(raw, u32::from(decimals)))
			},
		}
	}
}
