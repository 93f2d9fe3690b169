//! Asset identity and catalog metadata

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub mod errors;

pub use errors::AssetError;

use crate::networks::Chain;
use crate::providers::ProviderName;

/// Parsed asset identifier of the form `CHAIN.SYMBOL[-CONTRACT]`,
/// e.g. `BTC.BTC`, `ETH.USDT-0xdAC17F958D2ee523a2206206994597C13D831ec7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId {
	pub chain: Chain,
	pub ticker: String,
	pub contract: Option<String>,
}

impl AssetId {
	pub fn new(chain: Chain, ticker: impl Into<String>) -> Self {
		Self {
			chain,
			ticker: ticker.into(),
			contract: None,
		}
	}

	pub fn with_contract(chain: Chain, ticker: impl Into<String>, contract: impl Into<String>) -> Self {
		Self {
			chain,
			ticker: ticker.into(),
			contract: Some(contract.into()),
		}
	}

	/// The `SYMBOL[-CONTRACT]` part of the identifier.
	pub fn symbol(&self) -> String {
		match &self.contract {
			Some(contract) => format!("{}-{}", self.ticker, contract),
			None => self.ticker.clone(),
		}
	}

	/// Whether this asset is the gas asset of its chain (a native asset
	/// whose ticker matches the chain's gas symbol is decided by the
	/// registry; here we only know it carries no contract).
	pub fn is_native(&self) -> bool {
		self.contract.is_none()
	}
}

impl fmt::Display for AssetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.chain, self.symbol())
	}
}

impl FromStr for AssetId {
	type Err = AssetError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (chain_code, symbol) = s.split_once('.').ok_or_else(|| AssetError::InvalidIdentifier {
			identifier: s.to_string(),
		})?;

		let chain: Chain = chain_code.parse().map_err(|_| AssetError::UnknownChain {
			identifier: s.to_string(),
			chain: chain_code.to_string(),
		})?;

		if symbol.is_empty() {
			return Err(AssetError::InvalidIdentifier {
				identifier: s.to_string(),
			});
		}

		let (ticker, contract) = match symbol.split_once('-') {
			Some((ticker, contract)) if !contract.is_empty() => {
				(ticker.to_string(), Some(contract.to_string()))
			},
			_ => (symbol.to_string(), None),
		};

		Ok(AssetId {
			chain,
			ticker,
			contract,
		})
	}
}

impl Serialize for AssetId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_string().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for AssetId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(de::Error::custom)
	}
}

/// A routable asset from a provider catalog.
///
/// Identifier is globally unique within a provider's catalog; decimals are
/// immutable once assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
	/// Parsed `CHAIN.SYMBOL[-CONTRACT]` identifier
	pub id: AssetId,
	/// Native decimal count of the underlying token
	pub decimals: u8,
	/// External price-feed id, when a market rate is available
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_feed_id: Option<String>,
	/// Providers able to route this asset
	#[serde(default)]
	pub providers: Vec<ProviderName>,
}

impl Asset {
	pub fn new(id: AssetId, decimals: u8) -> Self {
		Self {
			id,
			decimals,
			price_feed_id: None,
			providers: Vec::new(),
		}
	}

	pub fn with_providers(mut self, providers: Vec<ProviderName>) -> Self {
		self.providers = providers;
		self
	}

	pub fn with_price_feed_id(mut self, price_feed_id: impl Into<String>) -> Self {
		self.price_feed_id = Some(price_feed_id.into());
		self
	}

	/// Whether the given provider can route this asset.
	pub fn routable_by(&self, provider: ProviderName) -> bool {
		self.providers.contains(&provider)
	}
}
