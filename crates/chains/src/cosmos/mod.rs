//! Cosmos family: bank-module balance queries and deposit messages

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::BalanceFetchError;
use crate::registry;
use uswap_types::constants::NORMALIZED_DECIMALS;
use uswap_types::Chain;

/// One coin inside a deposit message, denominated in the chain's
/// 8-decimal base units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositCoin {
	pub asset: String,
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
}

/// A Thorchain-style `MsgDeposit`: funds plus the swap memo, signed by the
/// depositing account. Type URL follows the chain's protobuf registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepositMsg {
	pub type_url: String,
	pub signer: String,
	pub memo: String,
	pub coins: Vec<DepositCoin>,
}

/// The encodable deposit produced by the Cosmos lowering path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CosmosDeposit {
	pub msg: DepositMsg,
	pub memo: String,
}

impl CosmosDeposit {
	pub fn new(signer: &str, asset: &str, amount: u128, memo: &str) -> Self {
		Self {
			msg: DepositMsg {
				type_url: "/types.MsgDeposit".to_string(),
				signer: signer.to_string(),
				memo: memo.to_string(),
				coins: vec![DepositCoin {
					asset: asset.to_string(),
					amount,
				}],
			},
			memo: memo.to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct BankBalancesResponse {
	#[serde(default)]
	balances: Vec<BankCoin>,
}

#[derive(Debug, Deserialize)]
struct BankCoin {
	denom: String,
	amount: String,
}

/// Bank-module balance for `address`, filtered by the chain's denom and
/// normalized to 8 decimals. A missing denom entry is a zero balance, not
/// an error.
pub async fn fetch_balance(
	client: &reqwest::Client,
	chain: Chain,
	endpoint: &str,
	address: &str,
) -> Result<u128, BalanceFetchError> {
	let props = registry::properties(chain);
	let denom = props.denom.ok_or_else(|| BalanceFetchError::Decode {
		reason: format!("{} has no bank denom", chain),
	})?;

	let url = format!("{}/cosmos/bank/v1beta1/balances/{}", endpoint, address);
	debug!(%url, denom, "fetching cosmos balance");

	let response = client.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(BalanceFetchError::Status {
			status: response.status().as_u16(),
		});
	}

	let body: BankBalancesResponse = response.json().await?;
	let amount = match body.balances.iter().find(|c| c.denom == denom) {
		Some(coin) => coin
			.amount
			.parse::<u128>()
			.map_err(|e| BalanceFetchError::Decode {
				reason: format!("invalid bank amount '{}': {}", coin.amount, e),
			})?,
		None => return Ok(0),
	};

	Ok(normalize(amount, props.decimals))
}

fn normalize(amount: u128, decimals: u32) -> u128 {
	if decimals >= NORMALIZED_DECIMALS {
		amount / 10u128.pow(decimals - NORMALIZED_DECIMALS)
	} else {
		amount * 10u128.pow(NORMALIZED_DECIMALS - decimals)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_deposit_msg_shape() {
		let deposit = CosmosDeposit::new("thor1signer", "THOR.RUNE", 100_000_000, "=:BTC.BTC:bc1q");
		assert_eq!(deposit.msg.type_url, "/types.MsgDeposit");
		assert_eq!(deposit.msg.coins.len(), 1);
		assert_eq!(deposit.msg.coins[0].amount, 100_000_000);
		assert_eq!(deposit.memo, "=:BTC.BTC:bc1q");

		let json = serde_json::to_value(&deposit).unwrap();
		assert_eq!(json["msg"]["coins"][0]["amount"], "100000000");
	}

	#[test]
	fn test_normalize_six_decimal_denoms() {
		// 2.5 ATOM in uatom
		assert_eq!(normalize(2_500_000, 6), 250_000_000);
		// native 8-decimal chains pass through
		assert_eq!(normalize(2_000_000, 8), 2_000_000);
	}
}
