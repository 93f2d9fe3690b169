//! XRP ledger: account balance lookup and payment construction

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::BalanceFetchError;
use uswap_types::constants::NORMALIZED_DECIMALS;

/// Drops per XRP are 10^6; normalized base units are 10^8.
const DROPS_TO_BASE: u128 = 10u128.pow(NORMALIZED_DECIMALS - 6);

/// An XRP `Payment` transaction in ledger JSON shape, memo hex-encoded per
/// the ledger's memo convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct XrpPayment {
	pub transaction_type: String,
	pub account: String,
	pub destination: String,
	/// Amount in drops, as a decimal string
	pub amount: String,
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub memos: Vec<XrpMemoWrapper>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct XrpMemoWrapper {
	#[serde(rename = "Memo")]
	pub memo: XrpMemo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct XrpMemo {
	/// Hex-encoded memo payload
	pub memo_data: String,
}

impl XrpPayment {
	/// Build a payment of `amount` 8-decimal base units.
	pub fn new(account: &str, destination: &str, amount: u128, memo: &str) -> Self {
		let drops = amount / DROPS_TO_BASE;
		let memos = if memo.is_empty() {
			Vec::new()
		} else {
			vec![XrpMemoWrapper {
				memo: XrpMemo {
					memo_data: hex_encode(memo.as_bytes()),
				},
			}]
		};

		Self {
			transaction_type: "Payment".to_string(),
			account: account.to_string(),
			destination: destination.to_string(),
			amount: drops.to_string(),
			memos,
		}
	}
}

fn hex_encode(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Ledger account balance normalized from 6 to 8 decimals.
pub async fn fetch_balance(
	client: &reqwest::Client,
	endpoint: &str,
	address: &str,
) -> Result<u128, BalanceFetchError> {
	let url = format!("{}/api/v1/account/{}", endpoint, address);
	debug!(%url, "fetching XRP balance");

	let response = client.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(BalanceFetchError::Status {
			status: response.status().as_u16(),
		});
	}

	let body: Value = response.json().await?;
	let drops = match body.get("Balance") {
		Some(Value::String(s)) => s.parse::<u128>().map_err(|e| BalanceFetchError::Decode {
			reason: format!("invalid Balance '{}': {}", s, e),
		})?,
		Some(Value::Number(n)) => n.as_u64().map(u128::from).ok_or_else(|| {
			BalanceFetchError::Decode {
				reason: format!("invalid Balance number {}", n),
			}
		})?,
		_ => {
			return Err(BalanceFetchError::Decode {
				reason: format!("no Balance field for {}", address),
			})
		},
	};

	Ok(drops * DROPS_TO_BASE)
}
