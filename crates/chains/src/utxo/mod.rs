//! UTXO family: explorer balance lookups and spend-plan construction

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::{BalanceFetchError, MessageError};
use uswap_types::Chain;

/// Maximum memo length embeddable in an OP_RETURN output.
pub const MAX_MEMO_BYTES: usize = 80;

/// Conservative vbyte weights for fee estimation.
const INPUT_VBYTES: u64 = 148;
const OUTPUT_VBYTES: u64 = 34;
const OVERHEAD_VBYTES: u64 = 10;

/// An unspent output belonging to the account, as reported by the wallet
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
	pub txid: String,
	pub vout: u32,
	/// Value in satoshis (already 8-decimal base units)
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub value: u128,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub script_pubkey: Option<String>,
}

/// A fully planned, unsigned UTXO spend: selected inputs, recipient and
/// change outputs, fee, and the memo to embed as an OP_RETURN output.
/// Handed to the wallet layer for signing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UtxoSpend {
	pub inputs: Vec<Utxo>,
	pub recipient: String,
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub fee: u128,
	/// Change returned to the sender; zero when the selection is exact
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub change: u128,
	pub change_address: String,
	pub memo: String,
}

/// Estimated virtual size of a spend with the given shape.
pub fn estimate_vsize(inputs: usize, outputs: usize, memo_len: usize) -> u64 {
	let memo_vbytes = if memo_len > 0 {
		// OP_RETURN output: 8-byte value + script overhead + payload
		11 + memo_len as u64
	} else {
		0
	};
	OVERHEAD_VBYTES + inputs as u64 * INPUT_VBYTES + outputs as u64 * OUTPUT_VBYTES + memo_vbytes
}

/// Select inputs and build a spend plan.
///
/// Largest-first selection; the fee is recomputed as inputs are added
/// since each input grows the transaction. Outputs are recipient + change
/// (+ OP_RETURN when a memo is present).
pub fn build_spend(
	utxos: &[Utxo],
	recipient: &str,
	change_address: &str,
	amount: u128,
	fee_rate: u64,
	memo: &str,
) -> Result<UtxoSpend, MessageError> {
	if memo.len() > MAX_MEMO_BYTES {
		return Err(MessageError::MemoTooLarge {
			len: memo.len(),
			limit: MAX_MEMO_BYTES,
		});
	}

	let mut candidates: Vec<Utxo> = utxos.to_vec();
	candidates.sort_by(|a, b| b.value.cmp(&a.value));

	let mut selected: Vec<Utxo> = Vec::new();
	let mut total: u128 = 0;

	for utxo in candidates {
		total += utxo.value;
		selected.push(utxo);

		let fee = estimate_vsize(selected.len(), 2, memo.len()) as u128 * fee_rate as u128;
		if total >= amount + fee {
			let change = total - amount - fee;
			return Ok(UtxoSpend {
				inputs: selected,
				recipient: recipient.to_string(),
				amount,
				fee,
				change,
				change_address: change_address.to_string(),
				memo: memo.to_string(),
			});
		}
	}

	let available = total;
	let fee = estimate_vsize(selected.len().max(1), 2, memo.len()) as u128 * fee_rate as u128;
	Err(MessageError::InsufficientFunds {
		required: amount + fee,
		available,
	})
}

/// Sum of funded-minus-spent outputs for an address, from the chain's
/// block explorer API.
pub async fn fetch_balance(
	client: &reqwest::Client,
	chain: Chain,
	endpoint: &str,
	api_key: Option<&str>,
	address: &str,
) -> Result<u128, BalanceFetchError> {
	match chain {
		Chain::Btc => fetch_blockchain_info(client, endpoint, address).await,
		Chain::Ltc | Chain::Doge | Chain::Bch => {
			fetch_blockchair(client, endpoint, api_key, address).await
		},
		_ => Err(BalanceFetchError::Decode {
			reason: format!("{} is not a UTXO chain", chain),
		}),
	}
}

async fn fetch_blockchain_info(
	client: &reqwest::Client,
	endpoint: &str,
	address: &str,
) -> Result<u128, BalanceFetchError> {
	let url = format!("{}/balance?active={}", endpoint, address);
	debug!(%url, "fetching UTXO balance");

	let response = client.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(BalanceFetchError::Status {
			status: response.status().as_u16(),
		});
	}

	let body: Value = response.json().await?;
	body.get(address)
		.and_then(|entry| entry.get("final_balance"))
		.and_then(Value::as_u64)
		.map(u128::from)
		.ok_or_else(|| BalanceFetchError::Decode {
			reason: format!("no final_balance for {}", address),
		})
}

async fn fetch_blockchair(
	client: &reqwest::Client,
	endpoint: &str,
	api_key: Option<&str>,
	address: &str,
) -> Result<u128, BalanceFetchError> {
	let mut url = format!("{}/dashboards/address/{}", endpoint, address);
	if let Some(key) = api_key {
		url.push_str(&format!("?key={}", key));
	}
	debug!(address, "fetching blockchair balance");

	let response = client.get(&url).send().await?;
	if !response.status().is_success() {
		return Err(BalanceFetchError::Status {
			status: response.status().as_u16(),
		});
	}

	let body: Value = response.json().await?;
	body.get("data")
		.and_then(|d| d.get(address))
		.and_then(|entry| entry.pointer("/address/balance"))
		.and_then(Value::as_u64)
		.map(u128::from)
		.ok_or_else(|| BalanceFetchError::Decode {
			reason: format!("no balance entry for {}", address),
		})
}
