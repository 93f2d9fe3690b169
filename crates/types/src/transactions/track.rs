//! Public tracking payloads: shareable URL parameters and poll responses

use serde::{Deserialize, Serialize};

use super::{TransactionLeg, TxStatus};
use crate::assets::AssetId;
use crate::providers::ProviderName;
use crate::serde_helpers::{option_string_amount, string_amount};

/// Query-string payload of the public tracking URL. Carries enough state to
/// reconstruct a tracking request without a connected wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackParams {
	pub provider: ProviderName,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub provider_swap_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hash: Option<String>,
	pub chain_id: String,
	pub from_asset: AssetId,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from_address: Option<String>,
	#[serde(with = "string_amount")]
	pub from_amount: u128,
	pub to_asset: AssetId,
	pub to_address: String,
	#[serde(with = "string_amount")]
	pub to_amount: u128,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deposit_address: Option<String>,
}

impl TrackParams {
	/// Encode as a URL query string.
	pub fn to_query(&self) -> Result<String, serde_urlencoded::ser::Error> {
		serde_urlencoded::to_string(self)
	}

	/// Decode from a URL query string.
	pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
		serde_urlencoded::from_str(query)
	}
}

/// Normalized provider status response for one poll.
///
/// `status` is taken from the provider's top-level stage field and is
/// authoritative; `legs` reflect per-transfer progress for display only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
	pub status: TxStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from_address: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_address: Option<String>,
	#[serde(with = "option_string_amount", default)]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_amount: Option<u128>,
	#[serde(default)]
	pub legs: Vec<TransactionLeg>,
	/// Raw provider payload, kept for the transaction record
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::networks::Chain;

	fn params() -> TrackParams {
		TrackParams {
			provider: ProviderName::Chainflip,
			provider_swap_id: Some("cf-123".to_string()),
			hash: Some("0xabc".to_string()),
			chain_id: "1".to_string(),
			from_asset: AssetId::new(Chain::Eth, "ETH"),
			from_address: Some("0xfeed".to_string()),
			from_amount: 150_000_000,
			to_asset: AssetId::new(Chain::Btc, "BTC"),
			to_address: "bc1qxyz".to_string(),
			to_amount: 1_250_000,
			deposit_address: None,
		}
	}

	#[test]
	fn test_query_round_trip() {
		let original = params();
		let query = original.to_query().unwrap();
		assert!(query.contains("provider=CHAINFLIP"));
		assert!(query.contains("fromAmount=150000000"));
		let back = TrackParams::from_query(&query).unwrap();
		assert_eq!(back, original);
	}

	#[test]
	fn test_query_omits_absent_fields() {
		let mut p = params();
		p.provider_swap_id = None;
		p.hash = None;
		let query = p.to_query().unwrap();
		assert!(!query.contains("providerSwapId"));
		assert!(!query.contains("hash"));
		assert_eq!(TrackParams::from_query(&query).unwrap(), p);
	}
}
