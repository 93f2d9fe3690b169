//! Swap-route providers: identity, runtime configuration and quote requests

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod traits;

pub use errors::{ProviderError, ProviderResult};
pub use traits::SwapProviderAdapter;

use crate::assets::{Asset, AssetId};
use crate::networks::Chain;
use crate::serde_helpers::string_amount;

/// Swap-route provider identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderName {
	Thorchain,
	ThorchainStreaming,
	Maya,
	MayaStreaming,
	Chainflip,
}

impl ProviderName {
	/// Streaming variants execute through the same backend as their base
	/// provider; this maps them onto the adapter that serves them.
	pub fn adapter_key(&self) -> ProviderName {
		match self {
			ProviderName::ThorchainStreaming => ProviderName::Thorchain,
			ProviderName::MayaStreaming => ProviderName::Maya,
			other => *other,
		}
	}

	/// Whether this entry is a streaming-swap route variant.
	pub fn is_streaming(&self) -> bool {
		matches!(
			self,
			ProviderName::ThorchainStreaming | ProviderName::MayaStreaming
		)
	}
}

impl fmt::Display for ProviderName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ProviderName::Thorchain => "THORCHAIN",
			ProviderName::ThorchainStreaming => "THORCHAIN_STREAMING",
			ProviderName::Maya => "MAYACHAIN",
			ProviderName::MayaStreaming => "MAYACHAIN_STREAMING",
			ProviderName::Chainflip => "CHAINFLIP",
		};
		f.write_str(name)
	}
}

/// Static description of an adapter implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderInfo {
	pub provider: ProviderName,
	pub name: String,
	pub version: String,
}

impl ProviderInfo {
	pub fn new(provider: ProviderName, name: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			provider,
			name: name.into(),
			version: version.into(),
		}
	}
}

/// Runtime configuration an adapter call executes against: endpoint,
/// timeout and extra headers come from settings, not from the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRuntimeConfig {
	pub provider: ProviderName,
	pub endpoint: String,
	pub timeout_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub headers: Option<HashMap<String, String>>,
}

impl ProviderRuntimeConfig {
	pub fn new(provider: ProviderName, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
		Self {
			provider,
			endpoint: endpoint.into(),
			timeout_ms,
			headers: None,
		}
	}
}

/// Affiliate parameters attached to quote requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
	pub address: String,
	pub bps: u16,
}

/// A quote request as seen by provider adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
	pub sell_asset: AssetId,
	pub buy_asset: AssetId,
	/// 8-decimal base units of the sell asset
	#[serde(with = "string_amount")]
	pub sell_amount: u128,
	pub slippage_bps: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub destination: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub affiliate: Option<Affiliate>,
	/// Constrained mode: route only through this provider
	#[serde(skip_serializing_if = "Option::is_none")]
	pub restrict_to: Option<ProviderName>,
}

impl QuoteParams {
	pub fn new(sell_asset: AssetId, buy_asset: AssetId, sell_amount: u128) -> Self {
		Self {
			sell_asset,
			buy_asset,
			sell_amount,
			slippage_bps: 100,
			destination: None,
			affiliate: None,
			restrict_to: None,
		}
	}
}

/// A per-swap, per-chain deposit address advertised by a provider, with
/// the gas rate and halt flag the fee estimator consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboundAddress {
	pub chain: Chain,
	pub address: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub router: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_rate: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_rate_units: Option<String>,
	#[serde(default)]
	pub halted: bool,
	#[serde(with = "crate::serde_helpers::option_string_amount", default)]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dust_threshold: Option<u128>,
}

/// Provider token catalog merged for asset discovery: de-duplicates by
/// identifier and unions the provider sets of duplicate entries.
pub fn merge_token_lists(lists: Vec<(ProviderName, Vec<Asset>)>) -> Vec<Asset> {
	let mut merged: Vec<Asset> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for (provider, assets) in lists {
		for mut asset in assets {
			if !asset.providers.contains(&provider) {
				asset.providers.push(provider);
			}
			let key = asset.id.to_string();
			match index.get(&key) {
				Some(&i) => {
					for p in asset.providers {
						if !merged[i].providers.contains(&p) {
							merged[i].providers.push(p);
						}
					}
				},
				None => {
					index.insert(key, merged.len());
					merged.push(asset);
				},
			}
		}
	}

	merged
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_streaming_maps_to_base_adapter() {
		assert_eq!(
			ProviderName::ThorchainStreaming.adapter_key(),
			ProviderName::Thorchain
		);
		assert_eq!(ProviderName::Chainflip.adapter_key(), ProviderName::Chainflip);
		assert!(ProviderName::MayaStreaming.is_streaming());
		assert!(!ProviderName::Thorchain.is_streaming());
	}

	#[test]
	fn test_provider_serde_names() {
		assert_eq!(
			serde_json::to_string(&ProviderName::ThorchainStreaming).unwrap(),
			"\"THORCHAIN_STREAMING\""
		);
	}

	#[test]
	fn test_merge_token_lists_unions_providers() {
		let rune = Asset::new(AssetId::new(Chain::Thor, "RUNE"), 8);
		let merged = merge_token_lists(vec![
			(ProviderName::Thorchain, vec![rune.clone()]),
			(ProviderName::Maya, vec![rune]),
		]);
		assert_eq!(merged.len(), 1);
		assert!(merged[0].routable_by(ProviderName::Thorchain));
		assert!(merged[0].routable_by(ProviderName::Maya));
	}
}
