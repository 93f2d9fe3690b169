//! THORChain adapter implementation
//!
//! Speaks to a THORNode directly: swap quotes, inbound addresses, the pool
//! catalog and the staged transaction status endpoint.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use uswap_types::serde_helpers::string_amount;
use uswap_types::{
	Asset, AssetId, Chain, FeeKind, InboundAddress, ProviderError, ProviderInfo, ProviderName,
	ProviderResult, ProviderRuntimeConfig, QuoteParams, Route, RouteFee, SwapProviderAdapter,
	TrackParams, TrackResponse, TransactionLeg, TxStatus,
};

/// Streaming quotes ask the node to split the swap into sub-swaps at this
/// block interval.
const STREAMING_INTERVAL_BLOCKS: u32 = 1;

/// THORNode swap quote response
#[derive(Debug, Clone, Deserialize)]
pub struct NodeQuoteResponse {
	pub inbound_address: Option<String>,
	pub memo: String,
	#[serde(with = "string_amount")]
	pub expected_amount_out: u128,
	pub router: Option<String>,
	pub fees: NodeQuoteFees,
	pub total_swap_seconds: Option<u64>,
	pub streaming_swap_seconds: Option<u64>,
}

/// Fee breakdown attached to a node quote, denominated in `asset`
#[derive(Debug, Clone, Deserialize)]
pub struct NodeQuoteFees {
	pub asset: String,
	#[serde(with = "string_amount")]
	pub affiliate: u128,
	#[serde(with = "string_amount")]
	pub outbound: u128,
	#[serde(with = "string_amount")]
	pub liquidity: u128,
}

/// One entry of the `/inbound_addresses` response
#[derive(Debug, Clone, Deserialize)]
pub struct NodeInboundAddress {
	pub chain: String,
	pub address: String,
	pub router: Option<String>,
	pub gas_rate: Option<String>,
	pub gas_rate_units: Option<String>,
	#[serde(default)]
	pub halted: bool,
	pub dust_threshold: Option<String>,
}

/// One entry of the `/pools` response
#[derive(Debug, Clone, Deserialize)]
pub struct NodePool {
	pub asset: String,
	pub status: String,
	pub decimals: Option<u8>,
}

/// Staged transaction status response
#[derive(Debug, Clone, Deserialize)]
pub struct NodeTxStatus {
	pub tx: Option<NodeTx>,
	#[serde(default)]
	pub planned_out_txs: Vec<NodePlannedOutTx>,
	#[serde(default)]
	pub out_txs: Vec<NodeTx>,
	pub stages: NodeStages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeTx {
	pub id: Option<String>,
	pub chain: Option<String>,
	pub from_address: Option<String>,
	pub to_address: Option<String>,
	#[serde(default)]
	pub coins: Vec<NodeCoin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeCoin {
	pub asset: String,
	pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodePlannedOutTx {
	pub chain: String,
	pub to_address: String,
	pub coin: NodeCoin,
	#[serde(default)]
	pub refund: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeStages {
	#[serde(default)]
	pub inbound_observed: StageState,
	#[serde(default)]
	pub inbound_finalised: StageState,
	#[serde(default)]
	pub swap_finalised: StageState,
	#[serde(default)]
	pub outbound_signed: StageState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageState {
	#[serde(default)]
	pub completed: bool,
}

/// THORChain adapter. Serves both the standard and streaming provider
/// entries; which one is being quoted arrives in the runtime config.
#[derive(Debug)]
pub struct ThorchainAdapter {
	info: ProviderInfo,
	client: Client,
}

impl ThorchainAdapter {
	pub fn new() -> Self {
		Self {
			info: ProviderInfo::new(ProviderName::Thorchain, "THORChain", "1"),
			client: default_client(),
		}
	}

	fn quote_url(&self, params: &QuoteParams, config: &ProviderRuntimeConfig) -> String {
		let mut url = format!(
			"{}/thorchain/quote/swap?from_asset={}&to_asset={}&amount={}&liquidity_tolerance_bps={}",
			config.endpoint,
			params.sell_asset,
			params.buy_asset,
			params.sell_amount,
			params.slippage_bps,
		);
		if let Some(destination) = &params.destination {
			url.push_str(&format!("&destination={}", destination));
		}
		if let Some(affiliate) = &params.affiliate {
			url.push_str(&format!(
				"&affiliate={}&affiliate_bps={}",
				affiliate.address, affiliate.bps
			));
		}
		if config.provider.is_streaming() {
			url.push_str(&format!("&streaming_interval={}", STREAMING_INTERVAL_BLOCKS));
		}
		url
	}

	/// Normalize a node quote into the common route shape.
	fn to_route(
		&self,
		quote: NodeQuoteResponse,
		params: &QuoteParams,
		provider: ProviderName,
	) -> ProviderResult<Route> {
		let fee_asset: AssetId =
			quote
				.fees
				.asset
				.parse()
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("quote fee asset: {}", e),
				})?;

		let mut fees = vec![
			RouteFee {
				kind: FeeKind::Outbound,
				asset: fee_asset.clone(),
				amount: quote.fees.outbound,
			},
			RouteFee {
				kind: FeeKind::Liquidity,
				asset: fee_asset.clone(),
				amount: quote.fees.liquidity,
			},
		];
		if quote.fees.affiliate > 0 {
			fees.push(RouteFee {
				kind: FeeKind::Affiliate,
				asset: fee_asset,
				amount: quote.fees.affiliate,
			});
		}

		let estimated_time_secs = if provider.is_streaming() {
			quote.streaming_swap_seconds.or(quote.total_swap_seconds)
		} else {
			quote.total_swap_seconds
		};

		Ok(Route {
			sell_asset: params.sell_asset.clone(),
			buy_asset: params.buy_asset.clone(),
			sell_amount: params.sell_amount,
			expected_buy_amount: quote.expected_amount_out,
			providers: vec![provider],
			fees,
			estimated_time_secs,
			target_address: quote.router,
			provider_swap_id: None,
			inbound_address: quote.inbound_address,
			memo: Some(quote.memo),
		})
	}
}

impl Default for ThorchainAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SwapProviderAdapter for ThorchainAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_routes(
		&self,
		params: &QuoteParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<Route>> {
		let url = self.quote_url(params, config);
		debug!(provider = %config.provider, %url, "fetching node quote");

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ProviderError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ProviderError::from_error_body(status.as_u16(), &body));
		}

		let quote: NodeQuoteResponse =
			response
				.json()
				.await
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("quote body: {}", e),
				})?;

		Ok(vec![self.to_route(quote, params, config.provider)?])
	}

	async fn inbound_addresses(
		&self,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<InboundAddress>> {
		let url = format!("{}/thorchain/inbound_addresses", config.endpoint);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ProviderError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ProviderError::from_error_body(status.as_u16(), &body));
		}

		let entries: Vec<NodeInboundAddress> =
			response
				.json()
				.await
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("inbound addresses body: {}", e),
				})?;

		Ok(convert_inbound_addresses(entries))
	}

	async fn token_list(&self, config: &ProviderRuntimeConfig) -> ProviderResult<Vec<Asset>> {
		let url = format!("{}/thorchain/pools", config.endpoint);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ProviderError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ProviderError::from_error_body(status.as_u16(), &body));
		}

		let pools: Vec<NodePool> =
			response
				.json()
				.await
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("pools body: {}", e),
				})?;

		Ok(convert_pools(pools, self.id()))
	}

	async fn track(
		&self,
		params: &TrackParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<TrackResponse> {
		let hash = params
			.hash
			.as_deref()
			.ok_or_else(|| ProviderError::InvalidResponse {
				reason: "tracking requires a transaction hash".to_string(),
			})?;
		let url = format!("{}/thorchain/tx/status/{}", config.endpoint, hash);
		debug!(%url, "fetching tx status");

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ProviderError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ProviderError::from_error_body(status.as_u16(), &body));
		}

		let raw: serde_json::Value =
			response
				.json()
				.await
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("tx status body: {}", e),
				})?;

		let node_status: NodeTxStatus =
			serde_json::from_value(raw.clone()).map_err(|e| ProviderError::InvalidResponse {
				reason: format!("tx status shape: {}", e),
			})?;

		Ok(convert_tx_status(node_status, params, raw))
	}
}

fn default_client() -> Client {
	Client::builder()
		.timeout(Duration::from_secs(10))
		.build()
		.unwrap_or_default()
}

/// Convert inbound address entries, skipping chains this build does not
/// support rather than failing the whole response.
pub(crate) fn convert_inbound_addresses(entries: Vec<NodeInboundAddress>) -> Vec<InboundAddress> {
	entries
		.into_iter()
		.filter_map(|entry| {
			let chain = match Chain::from_str(&entry.chain) {
				Ok(chain) => chain,
				Err(_) => {
					warn!(chain = %entry.chain, "skipping inbound address for unsupported chain");
					return None;
				},
			};
			Some(InboundAddress {
				chain,
				address: entry.address,
				router: entry.router,
				gas_rate: entry.gas_rate.and_then(|r| r.parse().ok()),
				gas_rate_units: entry.gas_rate_units,
				halted: entry.halted,
				dust_threshold: entry.dust_threshold.and_then(|d| d.parse().ok()),
			})
		})
		.collect()
}

/// Convert the pool catalog into assets, skipping unavailable pools and
/// identifiers outside the supported chain set.
pub(crate) fn convert_pools(pools: Vec<NodePool>, provider: ProviderName) -> Vec<Asset> {
	let providers = match provider {
		ProviderName::Thorchain => vec![ProviderName::Thorchain, ProviderName::ThorchainStreaming],
		ProviderName::Maya => vec![ProviderName::Maya, ProviderName::MayaStreaming],
		other => vec![other],
	};

	pools
		.into_iter()
		.filter(|pool| pool.status.eq_ignore_ascii_case("available"))
		.filter_map(|pool| {
			let id: AssetId = match pool.asset.parse() {
				Ok(id) => id,
				Err(_) => {
					warn!(asset = %pool.asset, "skipping pool with unsupported identifier");
					return None;
				},
			};
			Some(Asset::new(id, pool.decimals.unwrap_or(8)).with_providers(providers.clone()))
		})
		.collect()
}

/// Fold the staged status response into the common track shape. The
/// outbound-signed milestone is what moves a swap to `Completed`.
pub(crate) fn convert_tx_status(
	node: NodeTxStatus,
	params: &TrackParams,
	raw: serde_json::Value,
) -> TrackResponse {
	let refunded = node.planned_out_txs.iter().any(|out| out.refund);

	let status = if !node.stages.inbound_observed.completed {
		TxStatus::NotStarted
	} else if node.stages.outbound_signed.completed {
		if refunded {
			TxStatus::Refunded
		} else {
			TxStatus::Completed
		}
	} else if node.stages.inbound_finalised.completed && !node.stages.swap_finalised.completed {
		TxStatus::Swapping
	} else {
		TxStatus::Pending
	};

	let mut legs = Vec::new();

	// Deposit leg on the source chain
	legs.push(TransactionLeg {
		from_asset: params.from_asset.clone(),
		to_asset: params.from_asset.clone(),
		chain_id: params.chain_id.clone(),
		hash: params.hash.clone(),
		status: if node.stages.inbound_finalised.completed {
			TxStatus::Completed
		} else if node.stages.inbound_observed.completed {
			TxStatus::Pending
		} else {
			TxStatus::NotStarted
		},
	});

	// Swap + outbound leg
	let out_hash = node
		.out_txs
		.first()
		.and_then(|out| out.id.clone());
	let out_chain = node
		.planned_out_txs
		.first()
		.map(|out| out.chain.clone())
		.or_else(|| node.out_txs.first().and_then(|out| out.chain.clone()));
	let out_chain_id = out_chain
		.as_deref()
		.and_then(|code| Chain::from_str(code).ok())
		.map(|chain| chain.chain_id().to_string())
		.unwrap_or_else(|| params.to_asset.chain.chain_id().to_string());

	legs.push(TransactionLeg {
		from_asset: params.from_asset.clone(),
		to_asset: params.to_asset.clone(),
		chain_id: out_chain_id,
		hash: out_hash,
		status: if node.stages.outbound_signed.completed {
			TxStatus::Completed
		} else if node.stages.swap_finalised.completed {
			TxStatus::Pending
		} else {
			TxStatus::NotStarted
		},
	});

	let from_address = node
		.tx
		.as_ref()
		.and_then(|tx| tx.from_address.clone())
		.or_else(|| params.from_address.clone());

	TrackResponse {
		status,
		from_address,
		to_address: Some(params.to_address.clone()),
		to_amount: None,
		legs,
		details: Some(raw),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn quote_params() -> QuoteParams {
		QuoteParams::new(
			"BTC.BTC".parse().unwrap(),
			"THOR.RUNE".parse().unwrap(),
			50_000_000,
		)
	}

	fn track_params() -> TrackParams {
		TrackParams {
			provider: ProviderName::Thorchain,
			provider_swap_id: None,
			hash: Some("TXHASH".to_string()),
			chain_id: "bitcoin".to_string(),
			from_asset: "BTC.BTC".parse().unwrap(),
			from_address: None,
			from_amount: 50_000_000,
			to_asset: "THOR.RUNE".parse().unwrap(),
			to_address: "thor1dest".to_string(),
			to_amount: 100_000_000_000,
			deposit_address: None,
		}
	}

	#[test]
	fn test_quote_normalization() {
		let body = r#"{
			"inbound_address": "bc1qvault",
			"memo": "=:THOR.RUNE:thor1dest",
			"expected_amount_out": "100000000000",
			"fees": {
				"asset": "THOR.RUNE",
				"affiliate": "50000",
				"outbound": "2000000",
				"liquidity": "1500000"
			},
			"total_swap_seconds": 600
		}"#;
		let quote: NodeQuoteResponse = serde_json::from_str(body).unwrap();
		let adapter = ThorchainAdapter::new();
		let route = adapter
			.to_route(quote, &quote_params(), ProviderName::Thorchain)
			.unwrap();

		assert_eq!(route.expected_buy_amount, 100_000_000_000);
		assert_eq!(route.providers, vec![ProviderName::Thorchain]);
		assert_eq!(route.fees.len(), 3);
		assert_eq!(route.inbound_address.as_deref(), Some("bc1qvault"));
		assert_eq!(route.memo.as_deref(), Some("=:THOR.RUNE:thor1dest"));
		assert_eq!(route.estimated_time_secs, Some(600));
	}

	#[test]
	fn test_quote_url_streaming_variant() {
		let adapter = ThorchainAdapter::new();
		let config = ProviderRuntimeConfig::new(
			ProviderName::ThorchainStreaming,
			"https://node.example",
			8_000,
		);
		let url = adapter.quote_url(&quote_params(), &config);
		assert!(url.contains("streaming_interval=1"));

		let config = ProviderRuntimeConfig::new(ProviderName::Thorchain, "https://node.example", 8_000);
		let url = adapter.quote_url(&quote_params(), &config);
		assert!(!url.contains("streaming_interval"));
	}

	#[test]
	fn test_inbound_addresses_skip_unknown_chains() {
		let entries = vec![
			NodeInboundAddress {
				chain: "BTC".to_string(),
				address: "bc1qvault".to_string(),
				router: None,
				gas_rate: Some("24".to_string()),
				gas_rate_units: Some("satsperbyte".to_string()),
				halted: false,
				dust_threshold: Some("10000".to_string()),
			},
			NodeInboundAddress {
				chain: "SOL".to_string(),
				address: "unsupported".to_string(),
				router: None,
				gas_rate: None,
				gas_rate_units: None,
				halted: false,
				dust_threshold: None,
			},
		];
		let converted = convert_inbound_addresses(entries);
		assert_eq!(converted.len(), 1);
		assert_eq!(converted[0].chain, Chain::Btc);
		assert_eq!(converted[0].gas_rate, Some(24));
		assert_eq!(converted[0].dust_threshold, Some(10_000));
	}

	#[test]
	fn test_pool_conversion_filters_and_tags_providers() {
		let pools = vec![
			NodePool {
				asset: "BTC.BTC".to_string(),
				status: "Available".to_string(),
				decimals: None,
			},
			NodePool {
				asset: "ETH.USDT-0xdAC17F958D2ee523a2206206994597C13D831ec7".to_string(),
				status: "Available".to_string(),
				decimals: Some(6),
			},
			NodePool {
				asset: "ETH.FOO-0xbad".to_string(),
				status: "Staged".to_string(),
				decimals: None,
			},
		];
		let assets = convert_pools(pools, ProviderName::Thorchain);
		assert_eq!(assets.len(), 2);
		assert!(assets[0].routable_by(ProviderName::ThorchainStreaming));
		assert_eq!(assets[1].decimals, 6);
	}

	#[test]
	fn test_tx_status_outbound_signed_completes() {
		let body = r#"{
			"tx": {
				"id": "TXHASH",
				"chain": "BTC",
				"from_address": "bc1qsender",
				"coins": [{"asset": "BTC.BTC", "amount": "50000000"}]
			},
			"planned_out_txs": [
				{"chain": "THOR", "to_address": "thor1dest", "coin": {"asset": "THOR.RUNE", "amount": "100000000000"}}
			],
			"out_txs": [{"id": "OUTHASH", "chain": "THOR"}],
			"stages": {
				"inbound_observed": {"completed": true},
				"inbound_finalised": {"completed": true},
				"swap_finalised": {"completed": true},
				"outbound_signed": {"completed": true}
			}
		}"#;
		let raw: serde_json::Value = serde_json::from_str(body).unwrap();
		let node: NodeTxStatus = serde_json::from_value(raw.clone()).unwrap();
		let response = convert_tx_status(node, &track_params(), raw);

		assert_eq!(response.status, TxStatus::Completed);
		assert_eq!(response.legs.len(), 2);
		assert_eq!(response.legs[0].status, TxStatus::Completed);
		assert_eq!(response.legs[1].hash.as_deref(), Some("OUTHASH"));
		assert_eq!(response.legs[1].chain_id, "thorchain-1");
		assert_eq!(response.from_address.as_deref(), Some("bc1qsender"));
	}

	#[test]
	fn test_tx_status_unobserved_deposit_is_not_started() {
		let body = r#"{"stages": {}}"#;
		let raw: serde_json::Value = serde_json::from_str(body).unwrap();
		let node: NodeTxStatus = serde_json::from_value(raw.clone()).unwrap();
		let response = convert_tx_status(node, &track_params(), raw);
		assert_eq!(response.status, TxStatus::NotStarted);
	}

	#[test]
	fn test_tx_status_mid_swap_is_swapping() {
		let body = r#"{
			"stages": {
				"inbound_observed": {"completed": true},
				"inbound_finalised": {"completed": true},
				"swap_finalised": {"completed": false},
				"outbound_signed": {"completed": false}
			}
		}"#;
		let raw: serde_json::Value = serde_json::from_str(body).unwrap();
		let node: NodeTxStatus = serde_json::from_value(raw.clone()).unwrap();
		let response = convert_tx_status(node, &track_params(), raw);
		assert_eq!(response.status, TxStatus::Swapping);
	}

	#[test]
	fn test_tx_status_refund() {
		let body = r#"{
			"planned_out_txs": [
				{"chain": "BTC", "to_address": "bc1qsender", "coin": {"asset": "BTC.BTC", "amount": "49000000"}, "refund": true}
			],
			"stages": {
				"inbound_observed": {"completed": true},
				"inbound_finalised": {"completed": true},
				"swap_finalised": {"completed": true},
				"outbound_signed": {"completed": true}
			}
		}"#;
		let raw: serde_json::Value = serde_json::from_str(body).unwrap();
		let node: NodeTxStatus = serde_json::from_value(raw.clone()).unwrap();
		let response = convert_tx_status(node, &track_params(), raw);
		assert_eq!(response.status, TxStatus::Refunded);
	}
}
