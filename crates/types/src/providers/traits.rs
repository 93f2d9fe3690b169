//! Core adapter trait for swap-route provider implementations

use std::fmt::Debug;

use async_trait::async_trait;

use super::{InboundAddress, ProviderError, ProviderInfo, ProviderResult, ProviderRuntimeConfig,
	QuoteParams};
use crate::assets::Asset;
use crate::routes::Route;
use crate::transactions::{TrackParams, TrackResponse};

/// Interface every swap-route provider adapter implements.
///
/// `fetch_routes` is the only required operation; tracking, token lists and
/// inbound addresses default to `UnsupportedOperation` for providers that
/// do not expose them.
#[async_trait]
pub trait SwapProviderAdapter: Send + Sync + Debug {
	/// Static adapter description
	fn provider_info(&self) -> &ProviderInfo;

	/// Provider identity (for registry lookup and route attribution)
	fn id(&self) -> super::ProviderName {
		self.provider_info().provider
	}

	/// Fetch priced routes for a quote request. Returned routes are
	/// un-ranked; ranking happens in the aggregator.
	async fn fetch_routes(
		&self,
		params: &QuoteParams,
		config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<Route>>;

	/// Resolve the current status of a swap issued through this provider.
	async fn track(
		&self,
		_params: &TrackParams,
		_config: &ProviderRuntimeConfig,
	) -> ProviderResult<TrackResponse> {
		Err(ProviderError::UnsupportedOperation {
			operation: "track".to_string(),
			provider: self.id().to_string(),
		})
	}

	/// Provider token catalog for asset discovery.
	async fn token_list(&self, _config: &ProviderRuntimeConfig) -> ProviderResult<Vec<Asset>> {
		Err(ProviderError::UnsupportedOperation {
			operation: "token_list".to_string(),
			provider: self.id().to_string(),
		})
	}

	/// Current per-chain inbound deposit addresses with gas rates.
	async fn inbound_addresses(
		&self,
		_config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<InboundAddress>> {
		Err(ProviderError::UnsupportedOperation {
			operation: "inbound_addresses".to_string(),
			provider: self.id().to_string(),
		})
	}
}
