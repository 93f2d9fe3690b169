//! uswap Chains
//!
//! Chain-family plumbing for the swap orchestration core: the static chain
//! registry, per-family balance fetchers, network fee estimation and the
//! lowering of a chain-agnostic swap message into exactly one wire format.

pub mod balance;
pub mod cosmos;
pub mod errors;
pub mod evm;
pub mod fees;
pub mod message;
pub mod registry;
pub mod tron;
pub mod utxo;
pub mod xrp;

pub use balance::{BalanceFetcher, ChainEndpoints};
pub use errors::{
	BalanceFetchError, EvmRpcError, InsufficientAllowanceError, MessageError, SimulationError,
	UnsupportedNetworkError,
};
pub use fees::{apply_surcharge, spendable, GasFee};
pub use message::{EncodedTx, Erc20Allowance, LoweringContext, SwapMessage};
pub use registry::{properties, resolve, validate_address, ChainProperties};
