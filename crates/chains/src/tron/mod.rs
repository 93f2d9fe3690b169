//! TRON: account balance lookup and transfer transaction construction

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::BalanceFetchError;
use uswap_types::constants::NORMALIZED_DECIMALS;

/// Sun per TRX are 10^6; normalized base units are 10^8.
const SUN_TO_BASE: u128 = 10u128.pow(NORMALIZED_DECIMALS - 6);

/// A TRON transfer ready for the wallet layer to sign: native TRX send or
/// TRC-20 `transfer` call, with the swap memo attached as transaction data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TronTransaction {
	pub owner_address: String,
	pub to_address: String,
	/// Amount in sun for native sends, token base units for TRC-20
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
	/// TRC-20 contract when this is a token transfer
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contract: Option<String>,
	pub memo: String,
}

impl TronTransaction {
	/// Native TRX transfer of `amount` 8-decimal base units.
	pub fn native(owner: &str, to: &str, amount: u128, memo: &str) -> Self {
		Self {
			owner_address: owner.to_string(),
			to_address: to.to_string(),
			amount: amount / SUN_TO_BASE,
			contract: None,
			memo: memo.to_string(),
		}
	}

	/// TRC-20 transfer; `amount` is scaled from 8 decimals to the token's
	/// own decimal count.
	pub fn trc20(owner: &str, to: &str, contract: &str, amount: u128, decimals: u32, memo: &str) -> Self {
		let scaled = if decimals >= NORMALIZED_DECIMALS {
			amount * 10u128.pow(decimals - NORMALIZED_DECIMALS)
		} else {
			amount / 10u128.pow(NORMALIZED_DECIMALS - decimals)
		};
		Self {
			owner_address: owner.to_string(),
			to_address: to.to_string(),
			amount: scaled,
			contract: Some(contract.to_string()),
			memo: memo.to_string(),
		}
	}
}

/// Account balance from a TRON node API, native TRX or TRC-20.
///
/// TRC-20 amounts are normalized with `token_decimals` (catalog metadata);
/// the node response does not carry per-token decimals.
pub async fn fetch_balance(
	client: &reqwest::Client,
	endpoint: &str,
	address: &str,
	contract: Option<&str>,
	token_decimals: u32,
) -> Result<u128, BalanceFetchError> {
	let url = format!("{}/v1/accounts/{}", endpoint, address);
	debug!(%url, "fetching TRON balance");

	let response = client.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(BalanceFetchError::Status {
			status: response.status().as_u16(),
		});
	}

	let body: Value = response.json().await?;
	let account = body
		.get("data")
		.and_then(Value::as_array)
		.and_then(|entries| entries.first())
		.ok_or_else(|| BalanceFetchError::Decode {
			reason: format!("no account data for {}", address),
		})?;

	match contract {
		None => {
			let sun = account.get("balance").and_then(Value::as_u64).unwrap_or(0);
			Ok(u128::from(sun) * SUN_TO_BASE)
		},
		Some(contract) => {
			let raw = account
				.get("trc20")
				.and_then(Value::as_array)
				.and_then(|tokens| {
					tokens
						.iter()
						.filter_map(Value::as_object)
						.find_map(|entry| entry.get(contract))
				})
				.and_then(Value::as_str)
				.unwrap_or("0");

			let amount = raw.parse::<u128>().map_err(|e| BalanceFetchError::Decode {
				reason: format!("invalid trc20 amount '{}': {}", raw, e),
			})?;

			let normalized = if token_decimals >= NORMALIZED_DECIMALS {
				amount / 10u128.pow(token_decimals - NORMALIZED_DECIMALS)
			} else {
				amount * 10u128.pow(NORMALIZED_DECIMALS - token_decimals)
			};
			Ok(normalized)
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_native_transfer_in_sun() {
		// 2 TRX in 8-decimal units
		let tx = TronTransaction::native("TOwner", "TDest", 200_000_000, "memo");
		assert_eq!(tx.amount, 2_000_000);
		assert_eq!(tx.contract, None);
	}

	#[test]
	fn test_trc20_transfer_scales_to_token_decimals() {
		// 5 USDT (6 decimals) from 8-decimal base units
		let tx = TronTransaction::trc20("TOwner", "TDest", "TContract", 500_000_000, 6, "");
		assert_eq!(tx.amount, 5_000_000);
		assert_eq!(tx.contract.as_deref(), Some("TContract"));
	}
}
