//! EVM family: JSON-RPC client, ERC-20 calldata and unit conversion

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{hex, Address, U256};
use alloy_sol_types::{sol, SolCall};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::EvmRpcError;
use uswap_types::constants::NORMALIZED_DECIMALS;

sol! {
	function balanceOf(address owner) external view returns (uint256);
	function decimals() external view returns (uint8);
	function allowance(address owner, address spender) external view returns (uint256);
	function approve(address spender, uint256 amount) external returns (bool);
	function depositWithExpiry(
		address vault,
		address asset,
		uint256 amount,
		string memo,
		uint256 expiry
	) external payable;
}

/// An EVM transaction request ready to hand to a signer, plus enough
/// context for gas estimation. Hex-encoded fields follow the JSON-RPC
/// conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvmTransactionRequest {
	pub from: String,
	pub to: String,
	pub value: U256,
	/// 0x-prefixed calldata
	pub data: String,
}

impl EvmTransactionRequest {
	/// JSON-RPC call object for `eth_estimateGas` / `eth_call`.
	fn to_rpc_value(&self) -> Value {
		json!({
			"from": self.from,
			"to": self.to,
			"value": format!("{:#x}", self.value),
			"data": self.data,
		})
	}
}

/// Thin JSON-RPC client over reqwest. One instance per endpoint; no
/// retries, callers re-invoke on failure.
#[derive(Debug, Clone)]
pub struct EvmRpcClient {
	client: reqwest::Client,
	endpoint: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	result: Option<Value>,
	error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

impl EvmRpcClient {
	pub fn new(endpoint: impl Into<String>) -> Self {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(10))
			.build()
			.unwrap_or_default();
		Self {
			client,
			endpoint: endpoint.into(),
		}
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, EvmRpcError> {
		debug!(endpoint = %self.endpoint, method, "EVM RPC call");

		let response = self
			.client
			.post(&self.endpoint)
			.json(&json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": method,
				"params": params,
			}))
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(EvmRpcError::Status {
				status: response.status().as_u16(),
			});
		}

		let body: RpcResponse = response.json().await.map_err(|e| EvmRpcError::Decode {
			reason: e.to_string(),
		})?;

		if let Some(error) = body.error {
			return Err(EvmRpcError::Rpc {
				code: error.code,
				message: error.message,
			});
		}

		body.result.ok_or_else(|| EvmRpcError::Decode {
			reason: "response carries neither result nor error".to_string(),
		})
	}

	fn quantity(value: &Value) -> Result<U256, EvmRpcError> {
		let raw = value.as_str().ok_or_else(|| EvmRpcError::Decode {
			reason: format!("expected hex quantity, got {}", value),
		})?;
		U256::from_str(raw).map_err(|e| EvmRpcError::Decode {
			reason: format!("invalid hex quantity '{}': {}", raw, e),
		})
	}

	/// Native balance in wei.
	pub async fn get_balance(&self, address: &str) -> Result<U256, EvmRpcError> {
		let result = self
			.call("eth_getBalance", json!([address, "latest"]))
			.await?;
		Self::quantity(&result)
	}

	/// `eth_call` against a contract; returns the raw return data.
	pub async fn call_contract(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, EvmRpcError> {
		let result = self
			.call(
				"eth_call",
				json!([{ "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) }, "latest"]),
			)
			.await?;
		let raw = result.as_str().ok_or_else(|| EvmRpcError::Decode {
			reason: "eth_call result is not a string".to_string(),
		})?;
		hex::decode(raw).map_err(|e| EvmRpcError::Decode {
			reason: format!("invalid eth_call return data: {}", e),
		})
	}

	/// Gas units required by the transaction.
	pub async fn estimate_gas(&self, tx: &EvmTransactionRequest) -> Result<u64, EvmRpcError> {
		let result = self.call("eth_estimateGas", json!([tx.to_rpc_value()])).await?;
		let gas = Self::quantity(&result)?;
		gas.try_into().map_err(|_| EvmRpcError::Decode {
			reason: "gas estimate does not fit in u64".to_string(),
		})
	}

	/// Current gas price in wei.
	pub async fn gas_price(&self) -> Result<u128, EvmRpcError> {
		let result = self.call("eth_gasPrice", json!([])).await?;
		let price = Self::quantity(&result)?;
		price.try_into().map_err(|_| EvmRpcError::Decode {
			reason: "gas price does not fit in u128".to_string(),
		})
	}

	/// ERC-20 balance in the token's own base units.
	pub async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, EvmRpcError> {
		let data = balanceOfCall { owner }.abi_encode();
		let out = self.call_contract(token, data).await?;
		balanceOfCall::abi_decode_returns(&out).map_err(|e| EvmRpcError::Decode {
			reason: format!("balanceOf return: {}", e),
		})
	}

	/// ERC-20 decimal count.
	pub async fn erc20_decimals(&self, token: Address) -> Result<u8, EvmRpcError> {
		let data = decimalsCall {}.abi_encode();
		let out = self.call_contract(token, data).await?;
		decimalsCall::abi_decode_returns(&out).map_err(|e| EvmRpcError::Decode {
			reason: format!("decimals return: {}", e),
		})
	}

	/// Current allowance granted by `owner` to `spender`.
	pub async fn erc20_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, EvmRpcError> {
		let data = allowanceCall { owner, spender }.abi_encode();
		let out = self.call_contract(token, data).await?;
		allowanceCall::abi_decode_returns(&out).map_err(|e| EvmRpcError::Decode {
			reason: format!("allowance return: {}", e),
		})
	}
}

/// Transaction request approving `spender` for `amount` token base units
/// on `contract`.
pub fn approve_request(
	from: &str,
	contract: &str,
	spender: &str,
	amount: u128,
) -> Result<EvmTransactionRequest, EvmRpcError> {
	let spender = parse_address(spender)?;
	let call = approveCall {
		spender,
		amount: U256::from(amount),
	};
	Ok(EvmTransactionRequest {
		from: from.to_string(),
		to: contract.to_string(),
		value: U256::ZERO,
		data: format!("0x{}", hex::encode(call.abi_encode())),
	})
}

/// Parse a 0x-prefixed EVM address.
pub fn parse_address(raw: &str) -> Result<Address, EvmRpcError> {
	Address::from_str(raw).map_err(|e| EvmRpcError::Decode {
		reason: format!("invalid address '{}': {}", raw, e),
	})
}

/// Normalize a raw on-chain amount to 8-decimal base units.
pub fn normalize_amount(raw: U256, decimals: u32) -> u128 {
	let normalized = if decimals >= NORMALIZED_DECIMALS {
		raw / U256::from(10u64).pow(U256::from(decimals - NORMALIZED_DECIMALS))
	} else {
		raw * U256::from(10u64).pow(U256::from(NORMALIZED_DECIMALS - decimals))
	};
	// Anything beyond u128 at 8 decimals is past any circulating supply;
	// saturate rather than wrap.
	normalized.try_into().unwrap_or(u128::MAX)
}

/// [`normalize_amount`] for values already known to fit `u128` (gas
/// costs, wei fee totals).
pub fn normalize_wei(raw: u128, decimals: u32) -> u128 {
	normalize_amount(U256::from(raw), decimals)
}

/// Scale an 8-decimal amount back to raw on-chain units.
pub fn denormalize_amount(amount: u128, decimals: u32) -> U256 {
	let amount = U256::from(amount);
	if decimals >= NORMALIZED_DECIMALS {
		amount * U256::from(10u64).pow(U256::from(decimals - NORMALIZED_DECIMALS))
	} else {
		amount / U256::from(10u64).pow(U256::from(NORMALIZED_DECIMALS - decimals))
	}
}
