//! Supported blockchain networks and chain families

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A supported blockchain network, identified by its asset-id prefix
/// (the `BTC` of `BTC.BTC`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
	Btc,
	Ltc,
	Doge,
	Bch,
	Eth,
	Bsc,
	Avax,
	Base,
	Arb,
	Thor,
	Gaia,
	Osmo,
	Kuji,
	Noble,
	Xrp,
	Tron,
}

/// A class of blockchains sharing a transaction and signing model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
	Evm,
	Utxo,
	Cosmos,
	Xrp,
	Tron,
}

impl Chain {
	/// All supported networks, in a stable order.
	pub const ALL: [Chain; 16] = [
		Chain::Btc,
		Chain::Ltc,
		Chain::Doge,
		Chain::Bch,
		Chain::Eth,
		Chain::Bsc,
		Chain::Avax,
		Chain::Base,
		Chain::Arb,
		Chain::Thor,
		Chain::Gaia,
		Chain::Osmo,
		Chain::Kuji,
		Chain::Noble,
		Chain::Xrp,
		Chain::Tron,
	];

	/// The transaction/signing model this network belongs to.
	pub fn family(&self) -> ChainFamily {
		match self {
			Chain::Btc | Chain::Ltc | Chain::Doge | Chain::Bch => ChainFamily::Utxo,
			Chain::Eth | Chain::Bsc | Chain::Avax | Chain::Base | Chain::Arb => ChainFamily::Evm,
			Chain::Thor | Chain::Gaia | Chain::Osmo | Chain::Kuji | Chain::Noble => {
				ChainFamily::Cosmos
			},
			Chain::Xrp => ChainFamily::Xrp,
			Chain::Tron => ChainFamily::Tron,
		}
	}

	/// Asset-id prefix for this network (e.g. `"BTC"`).
	pub fn code(&self) -> &'static str {
		match self {
			Chain::Btc => "BTC",
			Chain::Ltc => "LTC",
			Chain::Doge => "DOGE",
			Chain::Bch => "BCH",
			Chain::Eth => "ETH",
			Chain::Bsc => "BSC",
			Chain::Avax => "AVAX",
			Chain::Base => "BASE",
			Chain::Arb => "ARB",
			Chain::Thor => "THOR",
			Chain::Gaia => "GAIA",
			Chain::Osmo => "OSMO",
			Chain::Kuji => "KUJI",
			Chain::Noble => "NOBLE",
			Chain::Xrp => "XRP",
			Chain::Tron => "TRON",
		}
	}

	/// Canonical chain identifier used by tracking payloads and explorer
	/// links (numeric string for EVM networks, named id otherwise).
	pub fn chain_id(&self) -> &'static str {
		match self {
			Chain::Btc => "bitcoin",
			Chain::Ltc => "litecoin",
			Chain::Doge => "dogecoin",
			Chain::Bch => "bitcoincash",
			Chain::Eth => "1",
			Chain::Bsc => "56",
			Chain::Avax => "43114",
			Chain::Base => "8453",
			Chain::Arb => "42161",
			Chain::Thor => "thorchain-1",
			Chain::Gaia => "cosmoshub-4",
			Chain::Osmo => "osmosis-1",
			Chain::Kuji => "kaiyo-1",
			Chain::Noble => "noble-1",
			Chain::Xrp => "xrp",
			Chain::Tron => "tron",
		}
	}

	/// Reverse of [`Chain::chain_id`].
	pub fn from_chain_id(id: &str) -> Option<Chain> {
		Chain::ALL.iter().copied().find(|c| c.chain_id() == id)
	}

	/// Public block-explorer URL for a transaction hash on this network.
	pub fn explorer_tx_url(&self, hash: &str) -> String {
		match self {
			Chain::Btc => format!("https://blockstream.info/tx/{}", hash),
			Chain::Ltc => format!("https://blockchair.com/litecoin/transaction/{}", hash),
			Chain::Doge => format!("https://blockchair.com/dogecoin/transaction/{}", hash),
			Chain::Bch => format!("https://blockchair.com/bitcoin-cash/transaction/{}", hash),
			Chain::Eth => format!("https://etherscan.io/tx/{}", hash),
			Chain::Bsc => format!("https://bscscan.com/tx/{}", hash),
			Chain::Avax => format!("https://snowtrace.io/tx/{}", hash),
			Chain::Base => format!("https://basescan.org/tx/{}", hash),
			Chain::Arb => format!("https://arbiscan.io/tx/{}", hash),
			Chain::Thor => format!("https://runescan.io/tx/{}", hash),
			Chain::Gaia => format!("https://www.mintscan.io/cosmos/tx/{}", hash),
			Chain::Osmo => format!("https://www.mintscan.io/osmosis/tx/{}", hash),
			Chain::Kuji => format!("https://finder.kujira.network/kaiyo-1/tx/{}", hash),
			Chain::Noble => format!("https://www.mintscan.io/noble/tx/{}", hash),
			Chain::Xrp => format!("https://xrpscan.com/tx/{}", hash),
			Chain::Tron => format!("https://tronscan.org/#/transaction/{}", hash),
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Error returned when parsing an unknown network code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown network code: {0}")]
pub struct ParseChainError(pub String);

impl FromStr for Chain {
	type Err = ParseChainError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Chain::ALL
			.iter()
			.copied()
			.find(|c| c.code() == s)
			.ok_or_else(|| ParseChainError(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_code_round_trip() {
		for chain in Chain::ALL {
			assert_eq!(chain.code().parse::<Chain>().unwrap(), chain);
		}
	}

	#[test]
	fn test_chain_id_round_trip() {
		for chain in Chain::ALL {
			assert_eq!(Chain::from_chain_id(chain.chain_id()), Some(chain));
		}
	}

	#[test]
	fn test_family_assignment() {
		assert_eq!(Chain::Btc.family(), ChainFamily::Utxo);
		assert_eq!(Chain::Base.family(), ChainFamily::Evm);
		assert_eq!(Chain::Thor.family(), ChainFamily::Cosmos);
		assert_eq!(Chain::Xrp.family(), ChainFamily::Xrp);
		assert_eq!(Chain::Tron.family(), ChainFamily::Tron);
	}

	#[test]
	fn test_serde_uses_codes() {
		let json = serde_json::to_string(&Chain::Bch).unwrap();
		assert_eq!(json, "\"BCH\"");
		assert_eq!(serde_json::from_str::<Chain>("\"BCH\"").unwrap(), Chain::Bch);
	}
}
