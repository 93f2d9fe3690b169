//! Maya Protocol adapter implementation
//!
//! Maya nodes expose the same staged API family as THORChain under the
//! `/mayachain` prefix; wire shapes are shared with the THORChain adapter
//! while endpoints and provider attribution differ.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::thorchain_adapter::{
	convert_inbound_addresses, convert_pools, convert_tx_status, NodeInboundAddress, NodePool,
	NodeQuoteResponse, NodeTxStatus,
};
use uswap_types::{
	Asset, FeeKind, InboundAddress, ProviderError, ProviderInfo, ProviderName, ProviderResult,
	ProviderRuntimeConfig, QuoteParams, Route, RouteFee, SwapProviderAdapter, TrackParams,
	TrackResponse,
};

/// Maya Protocol adapter.
#[derive(Debug)]
pub struct MayaAdapter {
	info: ProviderInfo,
	client: Client,
}

impl MayaAdapter {
	pub fn new() -> Self {
		Self {
			info: ProviderInfo::new(ProviderName::Maya, "Maya Protocol", "1"),
			client: Client::builder()
				.timeout(Duration::from_secs(10))
				.build()
				.unwrap_or_default(),
		}
	}

	fn quote_url(&self, params: &QuoteParams, config: &ProviderRuntimeConfig) -> String {
		let mut url = format!(
			"{}/mayachain/quote/swap?from_asset={}&to_asset={}&amount={}&tolerance_bps={}",
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
			url.push_str("&streaming_interval=3");
		}
		url
	}

	fn to_route(
		&self,
		quote: NodeQuoteResponse,
		params: &QuoteParams,
		provider: ProviderName,
	) -> ProviderResult<Route> {
		let fee_asset: uswap_types::AssetId =
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

		Ok(Route {
			sell_asset: params.sell_asset.clone(),
			buy_asset: params.buy_asset.clone(),
			sell_amount: params.sell_amount,
			expected_buy_amount: quote.expected_amount_out,
			providers: vec![provider],
			fees,
			estimated_time_secs: if provider.is_streaming() {
				quote.streaming_swap_seconds.or(quote.total_swap_seconds)
			} else {
				quote.total_swap_seconds
			},
			target_address: quote.router,
			provider_swap_id: None,
			inbound_address: quote.inbound_address,
			memo: Some(quote.memo),
		})
	}
}

impl Default for MayaAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SwapProviderAdapter for MayaAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_routes(
		&self,
		params: &QuoteParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<Route>> {
		let url = self.quote_url(params, config);
		debug!(provider = %config.provider, %url, "fetching maya quote");

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
		let url = format!("{}/mayachain/inbound_addresses", config.endpoint);

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
		let url = format!("{}/mayachain/pools", config.endpoint);

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
		let url = format!("{}/mayachain/tx/status/{}", config.endpoint, hash);

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
