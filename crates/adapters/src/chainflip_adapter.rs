//! Chainflip adapter implementation
//!
//! Chainflip prices swaps in each chain's native base units and tracks
//! them through a numbered swap lifecycle, so this adapter converts
//! between 8-decimal base units and native units on both edges.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use uswap_types::constants::NORMALIZED_DECIMALS;
use uswap_types::serde_helpers::string_amount;
use uswap_types::{
	AssetId, Chain, FeeKind, ProviderError, ProviderInfo, ProviderName, ProviderResult,
	ProviderRuntimeConfig, QuoteParams, Route, RouteFee, SwapProviderAdapter, TrackParams,
	TrackResponse, TransactionLeg, TxStatus,
};

/// One quote entry of the `/v2/quote` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfQuote {
	#[serde(rename = "type")]
	pub quote_type: String,
	#[serde(with = "string_amount")]
	pub egress_amount: u128,
	#[serde(default)]
	pub included_fees: Vec<CfFee>,
	pub estimated_duration_seconds: Option<u64>,
	pub deposit_address: Option<String>,
	pub quote_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfFee {
	#[serde(rename = "type")]
	pub fee_type: String,
	pub chain: String,
	pub asset: String,
	#[serde(with = "string_amount")]
	pub amount: u128,
}

/// `/v2/swaps/{id}` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfSwapStatus {
	pub state: String,
	pub src_chain: Option<String>,
	pub dest_chain: Option<String>,
	pub deposit_channel: Option<CfDepositChannel>,
	pub egress: Option<CfEgress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfDepositChannel {
	pub deposit_address: Option<String>,
	pub deposit_transaction_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfEgress {
	pub transaction_reference: Option<String>,
	pub amount: Option<String>,
}

/// Chainflip adapter for native cross-chain swaps.
#[derive(Debug)]
pub struct ChainflipAdapter {
	info: ProviderInfo,
	client: Client,
}

impl ChainflipAdapter {
	pub fn new() -> Self {
		Self {
			info: ProviderInfo::new(ProviderName::Chainflip, "Chainflip", "2"),
			client: Client::builder()
				.timeout(Duration::from_secs(10))
				.build()
				.unwrap_or_default(),
		}
	}

	/// Chainflip's chain naming for the networks it settles on.
	fn chain_name(chain: Chain) -> Option<&'static str> {
		match chain {
			Chain::Btc => Some("Bitcoin"),
			Chain::Eth => Some("Ethereum"),
			Chain::Arb => Some("Arbitrum"),
			_ => None,
		}
	}

	fn native_decimals(asset: &AssetId) -> u32 {
		uswap_chains::properties(asset.chain).decimals
	}

	/// 8-decimal base units to the asset's native base units.
	fn to_native(amount: u128, decimals: u32) -> u128 {
		if decimals >= NORMALIZED_DECIMALS {
			amount.saturating_mul(10u128.pow(decimals - NORMALIZED_DECIMALS))
		} else {
			amount / 10u128.pow(NORMALIZED_DECIMALS - decimals)
		}
	}

	/// Native base units back to 8-decimal base units.
	fn from_native(amount: u128, decimals: u32) -> u128 {
		if decimals >= NORMALIZED_DECIMALS {
			amount / 10u128.pow(decimals - NORMALIZED_DECIMALS)
		} else {
			amount.saturating_mul(10u128.pow(NORMALIZED_DECIMALS - decimals))
		}
	}

	fn to_route(&self, quote: CfQuote, params: &QuoteParams) -> Route {
		let buy_decimals = Self::native_decimals(&params.buy_asset);

		let fees = quote
			.included_fees
			.iter()
			.filter_map(|fee| {
				let kind = match fee.fee_type.as_str() {
					"INGRESS" => FeeKind::Inbound,
					"EGRESS" => FeeKind::Outbound,
					"LIQUIDITY" => FeeKind::Liquidity,
					"BROKER" => FeeKind::Affiliate,
					"NETWORK" => FeeKind::Network,
					_ => return None,
				};
				let asset = resolve_cf_asset(&fee.chain, &fee.asset)?;
				let decimals = Self::native_decimals(&asset);
				Some(RouteFee {
					kind,
					asset,
					amount: Self::from_native(fee.amount, decimals),
				})
			})
			.collect();

		Route {
			sell_asset: params.sell_asset.clone(),
			buy_asset: params.buy_asset.clone(),
			sell_amount: params.sell_amount,
			expected_buy_amount: Self::from_native(quote.egress_amount, buy_decimals),
			providers: vec![ProviderName::Chainflip],
			fees,
			estimated_time_secs: quote.estimated_duration_seconds,
			target_address: None,
			provider_swap_id: quote.quote_id,
			inbound_address: quote.deposit_address,
			memo: None,
		}
	}

	fn map_state(state: &str) -> TxStatus {
		match state {
			"AWAITING_DEPOSIT" => TxStatus::NotStarted,
			"DEPOSIT_RECEIVED" => TxStatus::Pending,
			"SWAPPING" | "EGRESS_SCHEDULED" => TxStatus::Swapping,
			"SENDING" => TxStatus::Pending,
			"SENT" | "COMPLETED" => TxStatus::Completed,
			"FAILED" => TxStatus::Failed,
			"REFUNDED" => TxStatus::Refunded,
			"EXPIRED" => TxStatus::Expired,
			_ => TxStatus::Unknown,
		}
	}
}

impl Default for ChainflipAdapter {
	fn default() -> Self {
		Self::new()
	}
}

fn resolve_cf_asset(chain: &str, asset: &str) -> Option<AssetId> {
	let chain = match chain {
		"Bitcoin" => Chain::Btc,
		"Ethereum" => Chain::Eth,
		"Arbitrum" => Chain::Arb,
		_ => return None,
	};
	Some(AssetId::new(chain, asset))
}

#[async_trait]
impl SwapProviderAdapter for ChainflipAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_routes(
		&self,
		params: &QuoteParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<Route>> {
		let src_chain = Self::chain_name(params.sell_asset.chain).ok_or_else(|| {
			ProviderError::Provider {
				message: format!("{} is not routable through Chainflip", params.sell_asset),
			}
		})?;
		let dest_chain = Self::chain_name(params.buy_asset.chain).ok_or_else(|| {
			ProviderError::Provider {
				message: format!("{} is not routable through Chainflip", params.buy_asset),
			}
		})?;

		let amount = Self::to_native(
			params.sell_amount,
			Self::native_decimals(&params.sell_asset),
		);
		let url = format!(
			"{}/v2/quote?srcChain={}&srcAsset={}&destChain={}&destAsset={}&amount={}",
			config.endpoint,
			src_chain,
			params.sell_asset.ticker,
			dest_chain,
			params.buy_asset.ticker,
			amount,
		);
		debug!(%url, "fetching chainflip quote");

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

		let quotes: Vec<CfQuote> =
			response
				.json()
				.await
				.map_err(|e| ProviderError::InvalidResponse {
					reason: format!("quote body: {}", e),
				})?;

		Ok(quotes
			.into_iter()
			.filter(|q| q.quote_type == "REGULAR")
			.map(|q| self.to_route(q, params))
			.collect())
	}

	async fn track(
		&self,
		params: &TrackParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<TrackResponse> {
		let id = params
			.provider_swap_id
			.as_deref()
			.or(params.hash.as_deref())
			.ok_or_else(|| ProviderError::InvalidResponse {
				reason: "tracking requires a swap id or hash".to_string(),
			})?;
		let url = format!("{}/v2/swaps/{}", config.endpoint, id);

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
					reason: format!("swap status body: {}", e),
				})?;

		let swap: CfSwapStatus =
			serde_json::from_value(raw.clone()).map_err(|e| ProviderError::InvalidResponse {
				reason: format!("swap status shape: {}", e),
			})?;

		Ok(convert_swap_status(swap, params, raw))
	}
}

fn convert_swap_status(
	swap: CfSwapStatus,
	params: &TrackParams,
	raw: serde_json::Value,
) -> TrackResponse {
	let status = ChainflipAdapter::map_state(&swap.state);

	let deposit_hash = swap
		.deposit_channel
		.as_ref()
		.and_then(|c| c.deposit_transaction_hash.clone())
		.or_else(|| params.hash.clone());

	let deposit_observed = !matches!(status, TxStatus::NotStarted);
	let egress_hash = swap.egress.as_ref().and_then(|e| e.transaction_reference.clone());

	let legs = vec![
		TransactionLeg {
			from_asset: params.from_asset.clone(),
			to_asset: params.from_asset.clone(),
			chain_id: params.chain_id.clone(),
			hash: deposit_hash,
			status: if deposit_observed {
				TxStatus::Completed
			} else {
				TxStatus::NotStarted
			},
		},
		TransactionLeg {
			from_asset: params.from_asset.clone(),
			to_asset: params.to_asset.clone(),
			chain_id: params.to_asset.chain.chain_id().to_string(),
			hash: egress_hash,
			status: if status == TxStatus::Completed {
				TxStatus::Completed
			} else if deposit_observed {
				TxStatus::Pending
			} else {
				TxStatus::NotStarted
			},
		},
	];

	TrackResponse {
		status,
		from_address: params.from_address.clone(),
		to_address: Some(params.to_address.clone()),
		to_amount: swap
			.egress
			.as_ref()
			.and_then(|e| e.amount.as_deref())
			.and_then(|a| a.parse::<u128>().ok())
			.map(|native| {
				ChainflipAdapter::from_native(
					native,
					ChainflipAdapter::native_decimals(&params.to_asset),
				)
			}),
		legs,
		details: Some(raw),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params() -> QuoteParams {
		QuoteParams::new(
			"BTC.BTC".parse().unwrap(),
			"ETH.ETH".parse().unwrap(),
			50_000_000, // 0.5 BTC
		)
	}

	#[test]
	fn test_quote_normalizes_native_units() {
		let body = r#"[{
			"type": "REGULAR",
			"egressAmount": "8000000000000000000",
			"includedFees": [
				{"type": "INGRESS", "chain": "Bitcoin", "asset": "BTC", "amount": "12000"},
				{"type": "EGRESS", "chain": "Ethereum", "asset": "ETH", "amount": "350000000000000"}
			],
			"estimatedDurationSeconds": 700,
			"quoteId": "cf-42"
		}]"#;
		let quotes: Vec<CfQuote> = serde_json::from_str(body).unwrap();
		let adapter = ChainflipAdapter::new();
		let route = adapter.to_route(quotes.into_iter().next().unwrap(), &params());

		// 8 ETH in wei -> 8e8 base units
		assert_eq!(route.expected_buy_amount, 800_000_000);
		assert_eq!(route.providers, vec![ProviderName::Chainflip]);
		assert_eq!(route.provider_swap_id.as_deref(), Some("cf-42"));
		// BTC fee stays in 8-decimal units, ETH fee scaled down from wei
		assert_eq!(route.fees[0].amount, 12_000);
		assert_eq!(route.fees[1].amount, 35_000);
	}

	#[test]
	fn test_unroutable_chain_is_provider_error() {
		let bad = QuoteParams::new(
			"DOGE.DOGE".parse().unwrap(),
			"ETH.ETH".parse().unwrap(),
			1,
		);
		assert!(ChainflipAdapter::chain_name(bad.sell_asset.chain).is_none());
	}

	#[test]
	fn test_state_mapping() {
		assert_eq!(ChainflipAdapter::map_state("AWAITING_DEPOSIT"), TxStatus::NotStarted);
		assert_eq!(ChainflipAdapter::map_state("SWAPPING"), TxStatus::Swapping);
		assert_eq!(ChainflipAdapter::map_state("COMPLETED"), TxStatus::Completed);
		assert_eq!(ChainflipAdapter::map_state("REFUNDED"), TxStatus::Refunded);
		assert_eq!(ChainflipAdapter::map_state("???"), TxStatus::Unknown);
	}

	#[test]
	fn test_swap_status_legs() {
		let track = TrackParams {
			provider: ProviderName::Chainflip,
			provider_swap_id: Some("cf-42".to_string()),
			hash: Some("btc-deposit".to_string()),
			chain_id: "bitcoin".to_string(),
			from_asset: "BTC.BTC".parse().unwrap(),
			from_address: None,
			from_amount: 50_000_000,
			to_asset: "ETH.ETH".parse().unwrap(),
			to_address: "0xdest".to_string(),
			to_amount: 800_000_000,
			deposit_address: None,
		};

		let body = r#"{
			"state": "COMPLETED",
			"srcChain": "Bitcoin",
			"destChain": "Ethereum",
			"depositChannel": {"depositAddress": "bc1qchannel", "depositTransactionHash": "btc-deposit"},
			"egress": {"transactionReference": "0xegress", "amount": "8000000000000000000"}
		}"#;
		let raw: serde_json::Value = serde_json::from_str(body).unwrap();
		let swap: CfSwapStatus = serde_json::from_value(raw.clone()).unwrap();
		let response = convert_swap_status(swap, &track, raw);

		assert_eq!(response.status, TxStatus::Completed);
		assert_eq!(response.to_amount, Some(800_000_000));
		assert_eq!(response.legs.len(), 2);
		assert_eq!(response.legs[1].hash.as_deref(), Some("0xegress"));
		assert_eq!(response.legs[1].chain_id, "1");
	}
}
