//! Fee simulation: per-family estimation with the flat safety surcharge,
//! and the ERC-20 allowance gate for EVM sell assets

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use uswap_chains::evm::{self, EvmRpcClient};
use uswap_chains::{
	apply_surcharge, fees, ChainEndpoints, Erc20Allowance, GasFee, InsufficientAllowanceError,
	SimulationError, SwapMessage,
};
use uswap_types::{Account, Chain, ChainFamily, InboundAddress};

/// Router deposits carry an expiry this far in the future.
const DEPOSIT_EXPIRY_SECS: i64 = 3_600;

/// An approval the user must grant before the swap can be broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
	pub spender: String,
	pub contract: String,
	/// Required allowance in the token's own base units
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
}

/// A computed fee quote, plus the pending-approval descriptor when an
/// EVM ERC-20 sell asset still needs an allowance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
	pub fee: GasFee,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub approval: Option<PendingApproval>,
}

/// Estimates the network fee required to relay a message, per chain
/// family, with a flat +10% surcharge on every raw estimate.
pub struct SimulationService {
	endpoints: ChainEndpoints,
}

impl SimulationService {
	pub fn new(endpoints: ChainEndpoints) -> Self {
		Self { endpoints }
	}

	/// Simulate relaying `message` from `account` to the inbound address.
	///
	/// EVM builds the full transaction request first so an ERC-20
	/// allowance shortfall surfaces before gas estimation; an unapproved
	/// spend cannot be estimated meaningfully. In that case the returned
	/// simulation carries the approval descriptor and prices the approval
	/// call instead of the swap.
	pub async fn simulate(
		&self,
		account: &Account,
		message: &SwapMessage,
		inbound: Option<&InboundAddress>,
	) -> Result<Simulation, SimulationError> {
		let chain = account.network;
		match chain.family() {
			ChainFamily::Evm => self.simulate_evm(account, message, inbound).await,
			_ => {
				let gas_rate = inbound.and_then(|i| i.gas_rate);
				let raw = fees::native_fee(chain, gas_rate, message.memo.len())?;
				let fee = GasFee::new(chain, apply_surcharge(raw));
				debug!(%chain, amount = fee.amount, "native fee estimated");
				Ok(Simulation {
					fee,
					approval: None,
				})
			},
		}
	}

	async fn simulate_evm(
		&self,
		account: &Account,
		message: &SwapMessage,
		inbound: Option<&InboundAddress>,
	) -> Result<Simulation, SimulationError> {
		let chain = account.network;
		let expiry = (Utc::now().timestamp() + DEPOSIT_EXPIRY_SECS) as u64;
		let (tx, allowance) = message.to_transaction_request(account, inbound, expiry)?;

		let rpc = EvmRpcClient::new(self.endpoints.url(chain));

		if let Some(required) = &allowance {
			let token = evm::parse_address(&required.contract)?;
			let owner = evm::parse_address(&account.address)?;
			let spender = evm::parse_address(&required.spender)?;

			let current = rpc.erc20_allowance(token, owner, spender).await?;
			let current: u128 = current.try_into().unwrap_or(u128::MAX);

			if current < required.amount {
				debug!(
					contract = %required.contract,
					current,
					required = required.amount,
					"allowance shortfall; pricing the approval call"
				);
				return self
					.price_approval(&rpc, account, required, chain)
					.await;
			}
		}

		let gas_units = rpc.estimate_gas(&tx).await?;
		let gas_price = rpc.gas_price().await?;
		let fee = self.evm_fee(chain, gas_units, gas_price);

		Ok(Simulation {
			fee,
			approval: None,
		})
	}

	async fn price_approval(
		&self,
		rpc: &EvmRpcClient,
		account: &Account,
		allowance: &Erc20Allowance,
		chain: Chain,
	) -> Result<Simulation, SimulationError> {
		let approve_tx = evm::approve_request(
			&account.address,
			&allowance.contract,
			&allowance.spender,
			allowance.amount,
		)?;

		let gas_units = rpc.estimate_gas(&approve_tx).await?;
		let gas_price = rpc.gas_price().await?;

		Ok(Simulation {
			fee: self.evm_fee(chain, gas_units, gas_price),
			approval: Some(PendingApproval {
				spender: allowance.spender.clone(),
				contract: allowance.contract.clone(),
				amount: allowance.amount,
			}),
		})
	}

	fn evm_fee(&self, chain: Chain, gas_units: u64, gas_price: u128) -> GasFee {
		let raw_wei = u128::from(gas_units).saturating_mul(gas_price);
		let raw = evm::normalize_wei(raw_wei, uswap_chains::properties(chain).decimals);
		GasFee::new(chain, apply_surcharge(raw)).with_gas_units(gas_units)
	}

	/// Broadcast gate: the spend is blocked until the required allowance
	/// exists on-chain. This is the error with its own remediation flow;
	/// it is deliberately distinct from generic simulation failures.
	pub async fn ensure_approved(
		&self,
		account: &Account,
		message: &SwapMessage,
		inbound: Option<&InboundAddress>,
	) -> Result<(), SimulationError> {
		if account.network.family() != ChainFamily::Evm {
			return Ok(());
		}

		let expiry = (Utc::now().timestamp() + DEPOSIT_EXPIRY_SECS) as u64;
		let (_, allowance) = message.to_transaction_request(account, inbound, expiry)?;

		if let Some(required) = allowance {
			let rpc = EvmRpcClient::new(self.endpoints.url(account.network));
			let token = evm::parse_address(&required.contract)?;
			let owner = evm::parse_address(&account.address)?;
			let spender = evm::parse_address(&required.spender)?;

			let current = rpc.erc20_allowance(token, owner, spender).await?;
			let current: u128 = current.try_into().unwrap_or(u128::MAX);

			if current < required.amount {
				return Err(SimulationError::InsufficientAllowance(
					InsufficientAllowanceError {
						spender: required.spender,
						contract: required.contract,
						required: required.amount,
					},
				));
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use uswap_chains::ChainEndpoints;
	use uswap_types::{Asset, AssetId, Chain, WalletProvider};

	fn inbound(chain: Chain, gas_rate: Option<u64>) -> InboundAddress {
		InboundAddress {
			chain,
			address: "vault".to_string(),
			router: None,
			gas_rate,
			gas_rate_units: None,
			halted: false,
			dust_threshold: None,
		}
	}

	#[tokio::test]
	async fn test_cosmos_fee_is_flat_plus_surcharge() {
		let service = SimulationService::new(ChainEndpoints::new());
		let account = Account::new("thor1abc", Chain::Thor, WalletProvider::Keystore);
		let message = SwapMessage::new(
			Asset::new(AssetId::new(Chain::Thor, "RUNE"), 8),
			100_000_000,
			"=:BTC.BTC:bc1q",
		);

		let sim = service
			.simulate(&account, &message, Some(&inbound(Chain::Thor, None)))
			.await
			.unwrap();
		// 0.02 RUNE flat fee, +10%
		assert_eq!(sim.fee.amount, 2_200_000);
		assert_eq!(sim.fee.asset.to_string(), "THOR.RUNE");
		assert!(sim.approval.is_none());
	}

	#[tokio::test]
	async fn test_utxo_fee_uses_inbound_gas_rate() {
		let service = SimulationService::new(ChainEndpoints::new());
		let account = Account::new("bc1qabc", Chain::Btc, WalletProvider::Keystore);
		let memo = "=:THOR.RUNE:thor1x";
		let message = SwapMessage::new(
			Asset::new(AssetId::new(Chain::Btc, "BTC"), 8),
			50_000_000,
			memo,
		);

		let sim = service
			.simulate(&account, &message, Some(&inbound(Chain::Btc, Some(20))))
			.await
			.unwrap();

		let raw = uswap_chains::fees::native_fee(Chain::Btc, Some(20), memo.len()).unwrap();
		assert_eq!(sim.fee.amount, apply_surcharge(raw));
		assert_eq!(sim.fee.asset.to_string(), "BTC.BTC");
	}

	#[tokio::test]
	async fn test_utxo_fee_without_gas_rate_fails() {
		let service = SimulationService::new(ChainEndpoints::new());
		let account = Account::new("bc1qabc", Chain::Btc, WalletProvider::Keystore);
		let message = SwapMessage::new(
			Asset::new(AssetId::new(Chain::Btc, "BTC"), 8),
			50_000_000,
			"",
		);

		let err = service
			.simulate(&account, &message, Some(&inbound(Chain::Btc, None)))
			.await
			.unwrap_err();
		assert!(matches!(err, SimulationError::Estimation { .. }));
	}
}
