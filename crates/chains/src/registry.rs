//! Static chain metadata: the single source of truth every dispatcher
//! keys off. Adding a network means one entry here plus one branch in each
//! family dispatcher.

use uswap_types::{AssetId, Chain, ChainFamily};

use crate::errors::UnsupportedNetworkError;

/// Static per-chain metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProperties {
	/// Ticker of the chain's gas asset (the asset fees are paid in)
	pub gas_asset: &'static str,
	/// Native decimal count of the gas asset on-chain
	pub decimals: u32,
	/// Default public endpoint (RPC, LCD or explorer API, per family)
	pub endpoint: &'static str,
	/// Bank-module denom for Cosmos chains
	pub denom: Option<&'static str>,
	/// Flat network fee in 8-decimal base units, for chains with
	/// deterministic fees (Cosmos, XRP, TRON)
	pub flat_fee: Option<u128>,
}

/// Properties for a supported network. Total over the closed [`Chain`]
/// enum; unknown networks can only arrive as strings and are rejected by
/// [`resolve`].
pub fn properties(chain: Chain) -> &'static ChainProperties {
	match chain {
		Chain::Btc => &ChainProperties {
			gas_asset: "BTC",
			decimals: 8,
			endpoint: "https://blockchain.info",
			denom: None,
			flat_fee: None,
		},
		Chain::Ltc => &ChainProperties {
			gas_asset: "LTC",
			decimals: 8,
			endpoint: "https://api.blockchair.com/litecoin",
			denom: None,
			flat_fee: None,
		},
		Chain::Doge => &ChainProperties {
			gas_asset: "DOGE",
			decimals: 8,
			endpoint: "https://api.blockchair.com/dogecoin",
			denom: None,
			flat_fee: None,
		},
		Chain::Bch => &ChainProperties {
			gas_asset: "BCH",
			decimals: 8,
			endpoint: "https://api.blockchair.com/bitcoin-cash",
			denom: None,
			flat_fee: None,
		},
		Chain::Eth => &ChainProperties {
			gas_asset: "ETH",
			decimals: 18,
			endpoint: "https://eth.llamarpc.com",
			denom: None,
			flat_fee: None,
		},
		Chain::Bsc => &ChainProperties {
			gas_asset: "BNB",
			decimals: 18,
			endpoint: "https://bsc-dataseed.binance.org",
			denom: None,
			flat_fee: None,
		},
		Chain::Avax => &ChainProperties {
			gas_asset: "AVAX",
			decimals: 18,
			endpoint: "https://api.avax.network/ext/bc/C/rpc",
			denom: None,
			flat_fee: None,
		},
		Chain::Base => &ChainProperties {
			gas_asset: "ETH",
			decimals: 18,
			endpoint: "https://mainnet.base.org",
			denom: None,
			flat_fee: None,
		},
		Chain::Arb => &ChainProperties {
			gas_asset: "ETH",
			decimals: 18,
			endpoint: "https://arb1.arbitrum.io/rpc",
			denom: None,
			flat_fee: None,
		},
		Chain::Thor => &ChainProperties {
			gas_asset: "RUNE",
			decimals: 8,
			endpoint: "https://thornode.ninerealms.com",
			denom: Some("rune"),
			// 0.02 RUNE native outbound fee
			flat_fee: Some(2_000_000),
		},
		Chain::Gaia => &ChainProperties {
			gas_asset: "ATOM",
			decimals: 6,
			endpoint: "https://cosmos-rest.publicnode.com",
			denom: Some("uatom"),
			flat_fee: Some(200_000),
		},
		Chain::Osmo => &ChainProperties {
			gas_asset: "OSMO",
			decimals: 6,
			endpoint: "https://osmosis-rest.publicnode.com",
			denom: Some("uosmo"),
			flat_fee: Some(400_000),
		},
		Chain::Kuji => &ChainProperties {
			gas_asset: "KUJI",
			decimals: 6,
			endpoint: "https://kujira-rest.publicnode.com",
			denom: Some("ukuji"),
			flat_fee: Some(200_000),
		},
		Chain::Noble => &ChainProperties {
			gas_asset: "USDC",
			decimals: 6,
			endpoint: "https://noble-api.polkachu.com",
			denom: Some("uusdc"),
			flat_fee: Some(200_000),
		},
		Chain::Xrp => &ChainProperties {
			gas_asset: "XRP",
			decimals: 6,
			endpoint: "https://api.xrpscan.com",
			denom: None,
			// 12 drops reference fee
			flat_fee: Some(1_200),
		},
		Chain::Tron => &ChainProperties {
			gas_asset: "TRX",
			decimals: 6,
			endpoint: "https://api.trongrid.io",
			denom: None,
			// 1.1 TRX bandwidth/energy budget for a transfer
			flat_fee: Some(110_000_000),
		},
	}
}

/// Resolve a wire-level network code. Unknown codes fail with
/// [`UnsupportedNetworkError`].
pub fn resolve(code: &str) -> Result<(Chain, &'static ChainProperties), UnsupportedNetworkError> {
	let chain: Chain = code
		.parse()
		.map_err(|_| UnsupportedNetworkError(code.to_string()))?;
	Ok((chain, properties(chain)))
}

/// Whether `asset` is the gas asset of its own chain.
pub fn is_gas_asset(asset: &AssetId) -> bool {
	asset.contract.is_none() && asset.ticker == properties(asset.chain).gas_asset
}

/// Shape-level address validation for a network. Charset and length checks
/// only; no checksum verification.
pub fn validate_address(chain: Chain, address: &str) -> bool {
	match chain.family() {
		ChainFamily::Evm => is_evm_address(address),
		ChainFamily::Utxo => is_utxo_address(chain, address),
		ChainFamily::Cosmos => is_bech32_address(cosmos_prefix(chain), address),
		ChainFamily::Xrp => is_xrp_address(address),
		ChainFamily::Tron => is_tron_address(address),
	}
}

fn cosmos_prefix(chain: Chain) -> &'static str {
	match chain {
		Chain::Thor => "thor",
		Chain::Gaia => "cosmos",
		Chain::Osmo => "osmo",
		Chain::Kuji => "kujira",
		Chain::Noble => "noble",
		_ => "",
	}
}

fn is_evm_address(address: &str) -> bool {
	address.len() == 42
		&& address.starts_with("0x")
		&& address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn is_base58(s: &str) -> bool {
	!s.is_empty() && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

fn is_bech32_charset(s: &str) -> bool {
	s.bytes()
		.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn is_utxo_address(chain: Chain, address: &str) -> bool {
	if !(26..=90).contains(&address.len()) {
		return false;
	}
	match chain {
		Chain::Btc => {
			(address.starts_with("bc1") && is_bech32_charset(&address[3..]))
				|| ((address.starts_with('1') || address.starts_with('3')) && is_base58(address))
		},
		Chain::Ltc => {
			(address.starts_with("ltc1") && is_bech32_charset(&address[4..]))
				|| ((address.starts_with('L') || address.starts_with('M')) && is_base58(address))
		},
		Chain::Doge => address.starts_with('D') && is_base58(address),
		Chain::Bch => {
			let stripped = address.strip_prefix("bitcoincash:").unwrap_or(address);
			(stripped.starts_with('q') || stripped.starts_with('p')) && is_bech32_charset(stripped)
				|| is_base58(stripped)
		},
		_ => false,
	}
}

fn is_bech32_address(prefix: &str, address: &str) -> bool {
	if prefix.is_empty() {
		return false;
	}
	match address.strip_prefix(prefix).and_then(|r| r.strip_prefix('1')) {
		Some(rest) => rest.len() >= 32 && is_bech32_charset(rest),
		None => false,
	}
}

fn is_xrp_address(address: &str) -> bool {
	address.starts_with('r') && (25..=35).contains(&address.len()) && is_base58(address)
}

fn is_tron_address(address: &str) -> bool {
	address.starts_with('T') && address.len() == 34 && is_base58(address)
}
