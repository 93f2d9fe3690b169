//! Storage traits for pluggable persistence implementations

pub mod traits;

pub use traits::{
	PreferenceStorage, Storage, StorageError, StorageResult, TransactionStorage,
};

use serde::{Deserialize, Serialize};

use crate::assets::AssetId;
use crate::networks::Chain;
use crate::serde_helpers::string_amount;

/// Version of the persisted preference/transaction blob shape. Bump on any
/// persisted-shape change; stores discard state written under a different
/// version (forward migration is the embedding application's concern).
pub const SCHEMA_VERSION: u32 = 2;

/// Persisted swap preferences: slippage tolerance and the last-selected
/// pair and amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapPreferences {
	pub schema_version: u32,
	pub slippage_bps: u16,
	pub sell_asset: AssetId,
	pub buy_asset: AssetId,
	#[serde(with = "string_amount")]
	pub sell_amount: u128,
}

impl Default for SwapPreferences {
	fn default() -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			slippage_bps: 100,
			sell_asset: AssetId::new(Chain::Btc, "BTC"),
			buy_asset: AssetId::new(Chain::Thor, "RUNE"),
			sell_amount: 50_000_000,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_pair() {
		let prefs = SwapPreferences::default();
		assert_eq!(prefs.sell_asset.to_string(), "BTC.BTC");
		assert_eq!(prefs.buy_asset.to_string(), "THOR.RUNE");
		assert_eq!(prefs.schema_version, SCHEMA_VERSION);
	}
}
