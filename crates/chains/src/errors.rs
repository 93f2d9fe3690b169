//! Error types for chain registry, balance, RPC and lowering operations

use thiserror::Error;
use uswap_types::Chain;

/// Registry miss: the wire carried a network code this build does not
/// know. A programming or catalog error, never user-facing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported network: {0}")]
pub struct UnsupportedNetworkError(pub String);

/// EVM JSON-RPC failure.
#[derive(Debug, Error)]
pub enum EvmRpcError {
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("RPC endpoint returned HTTP {status}")]
	Status { status: u16 },

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("invalid RPC response: {reason}")]
	Decode { reason: String },
}

/// Upstream failure while resolving a balance. Non-fatal: callers treat a
/// missing balance as zero spendable rather than blocking the flow, and
/// retries are the caller's responsibility.
#[derive(Debug, Error)]
pub enum BalanceFetchError {
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("balance endpoint returned HTTP {status}")]
	Status { status: u16 },

	#[error("invalid balance response: {reason}")]
	Decode { reason: String },

	#[error("no endpoint configured for {chain}")]
	MissingEndpoint { chain: Chain },

	#[error(transparent)]
	Rpc(#[from] EvmRpcError),

	#[error(transparent)]
	UnsupportedNetwork(#[from] UnsupportedNetworkError),
}

/// Failure while lowering a swap message into a wire format.
#[derive(Debug, Error)]
pub enum MessageError {
	#[error("operation {operation} is not valid for network {network}")]
	UnsupportedOperation {
		operation: &'static str,
		network: Chain,
	},

	#[error(transparent)]
	UnsupportedNetwork(#[from] UnsupportedNetworkError),

	#[error("insufficient funds: required {required} base units, available {available}")]
	InsufficientFunds { required: u128, available: u128 },

	#[error("inbound address required for {chain} deposits")]
	MissingInboundAddress { chain: Chain },

	#[error("no router advertised for {chain} token deposits")]
	MissingRouter { chain: Chain },

	#[error("no gas rate available for {chain}")]
	MissingGasRate { chain: Chain },

	#[error("memo of {len} bytes exceeds the {limit}-byte limit")]
	MemoTooLarge { len: usize, limit: usize },

	#[error("invalid {chain} address: {address}")]
	InvalidAddress { chain: Chain, address: String },
}

/// An ERC-20 spend is blocked until the spender is approved. Surfaced
/// distinctly from generic simulation errors; it has its own remediation
/// flow (approve, then retry).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("allowance of {required} required for spender {spender} on token {contract}")]
pub struct InsufficientAllowanceError {
	pub spender: String,
	pub contract: String,
	/// Required allowance in the token's own base units
	pub required: u128,
}

/// Fee estimation failed; blocks swap submission until re-run.
#[derive(Debug, Error)]
pub enum SimulationError {
	#[error(transparent)]
	InsufficientAllowance(#[from] InsufficientAllowanceError),

	#[error("balance lookup failed: {0}")]
	Balance(#[from] BalanceFetchError),

	#[error("message lowering failed: {0}")]
	Lowering(#[from] MessageError),

	#[error(transparent)]
	Rpc(#[from] EvmRpcError),

	#[error("fee estimation failed: {reason}")]
	Estimation { reason: String },
}
