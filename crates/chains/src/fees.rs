//! Network fee estimation and spendable-balance arithmetic

use serde::{Deserialize, Serialize};

use crate::errors::SimulationError;
use crate::{registry, utxo};
use uswap_types::constants::{BPS_DENOM, FEE_SURCHARGE_BPS};
use uswap_types::{AssetId, Chain, ChainFamily};

/// A computed network fee quote. Amount is always denominated in the gas
/// asset's 8-decimal base units, independent of the traded asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GasFee {
	pub asset: AssetId,
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_units: Option<u64>,
}

impl GasFee {
	pub fn new(chain: Chain, amount: u128) -> Self {
		Self {
			asset: AssetId::new(chain, registry::properties(chain).gas_asset),
			amount,
			gas_units: None,
		}
	}

	pub fn with_gas_units(mut self, gas_units: u64) -> Self {
		self.gas_units = Some(gas_units);
		self
	}
}

/// Flat surcharge on a raw fee estimate, absorbing gas-price movement
/// between simulation and broadcast. 1000 base units become exactly 1100.
pub fn apply_surcharge(raw_fee: u128) -> u128 {
	raw_fee * (BPS_DENOM + FEE_SURCHARGE_BPS) / BPS_DENOM
}

/// Balance available for trading once the network fee is reserved.
///
/// The fee is only subtracted when the traded asset is the chain's gas
/// asset; token transfers never pay fees from the token balance itself.
/// Floored at zero.
pub fn spendable(balance: u128, fee: u128, is_gas_asset: bool) -> u128 {
	if is_gas_asset {
		balance.saturating_sub(fee)
	} else {
		balance
	}
}

/// Raw (un-surcharged) fee for a deposit on a non-EVM chain.
///
/// UTXO chains price by estimated virtual size and the provider-advertised
/// sat/vB gas rate; Cosmos, XRP and TRON carry deterministic flat fees
/// from the registry. EVM fees need a transaction request and live in the
/// simulation path.
pub fn native_fee(
	chain: Chain,
	gas_rate: Option<u64>,
	memo_len: usize,
) -> Result<u128, SimulationError> {
	let props = registry::properties(chain);

	match chain.family() {
		ChainFamily::Utxo => {
			let rate = gas_rate.ok_or_else(|| SimulationError::Estimation {
				reason: format!("no gas rate available for {}", chain),
			})?;
			// one input, recipient + change outputs, memo via OP_RETURN
			let vsize = utxo::estimate_vsize(1, 2, memo_len);
			Ok(u128::from(vsize) * u128::from(rate))
		},
		ChainFamily::Cosmos | ChainFamily::Xrp | ChainFamily::Tron => {
			props.flat_fee.ok_or_else(|| SimulationError::Estimation {
				reason: format!("no flat fee registered for {}", chain),
			})
		},
		ChainFamily::Evm => Err(SimulationError::Estimation {
			reason: "EVM fees require a transaction request".to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_surcharge_is_exactly_ten_percent() {
		assert_eq!(apply_surcharge(1000), 1100);
		assert_eq!(apply_surcharge(0), 0);
		assert_eq!(apply_surcharge(10_000), 11_000);
		// integer floor on non-multiples
		assert_eq!(apply_surcharge(5), 5);
		assert_eq!(apply_surcharge(10), 11);
	}

	#[test]
	fn test_spendable_subtracts_fee_for_gas_asset() {
		assert_eq!(spendable(5000, 1100, true), 3900);
	}

	#[test]
	fn test_spendable_floors_at_zero() {
		assert_eq!(spendable(50, 1100, true), 0);
	}

	#[test]
	fn test_spendable_ignores_fee_for_tokens() {
		assert_eq!(spendable(5000, 1100, false), 5000);
	}

	#[test]
	fn test_native_fee_utxo_uses_gas_rate() {
		let fee = native_fee(Chain::Btc, Some(10), 20).unwrap();
		let expected = u128::from(utxo::estimate_vsize(1, 2, 20)) * 10;
		assert_eq!(fee, expected);

		let err = native_fee(Chain::Btc, None, 0).unwrap_err();
		assert!(matches!(err, SimulationError::Estimation { .. }));
	}

	#[test]
	fn test_native_fee_flat_chains() {
		assert_eq!(native_fee(Chain::Thor, None, 64).unwrap(), 2_000_000);
		assert_eq!(native_fee(Chain::Xrp, None, 0).unwrap(), 1_200);
	}

	#[test]
	fn test_native_fee_rejects_evm() {
		assert!(native_fee(Chain::Eth, None, 0).is_err());
	}

	#[test]
	fn test_gas_fee_denominated_in_gas_asset() {
		let fee = GasFee::new(Chain::Bsc, 1_000).with_gas_units(21_000);
		assert_eq!(fee.asset.to_string(), "BSC.BNB");
		assert_eq!(fee.gas_units, Some(21_000));
	}
}
