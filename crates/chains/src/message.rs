//! The chain-agnostic swap message and its lowering into wire formats
//!
//! One message, five lowering paths. The dispatch key is the depositing
//! account's chain family, resolved once; exactly one path succeeds for a
//! given (message, network) pair and every other path fails with
//! `UnsupportedOperation`.

use alloy_primitives::hex;
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::cosmos::CosmosDeposit;
use crate::errors::MessageError;
use crate::evm::{self, depositWithExpiryCall, EvmTransactionRequest};
use crate::registry;
use crate::tron::TronTransaction;
use crate::utxo::{self, Utxo, UtxoSpend};
use crate::xrp::XrpPayment;
use uswap_types::{Account, Asset, Chain, ChainFamily, InboundAddress};

/// An ERC-20 approval the caller must satisfy before the main transaction
/// can be broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Erc20Allowance {
	pub contract: String,
	pub spender: String,
	/// Required allowance in the token's own base units
	#[serde(with = "uswap_types::serde_helpers::string_amount")]
	pub amount: u128,
	pub decimals: u8,
	pub symbol: String,
}

/// "Send this asset to this destination with this memo", independent of
/// chain family. Built fresh per swap attempt; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapMessage {
	pub sell_asset: Asset,
	/// 8-decimal base units of the sell asset
	pub amount: u128,
	pub memo: String,
}

/// Everything a lowering needs besides the message itself.
#[derive(Debug, Clone, Default)]
pub struct LoweringContext {
	pub inbound: Option<InboundAddress>,
	/// Account UTXO set, for the UTXO path
	pub utxos: Vec<Utxo>,
	/// sat/vB override; defaults to the inbound address gas rate
	pub fee_rate: Option<u64>,
	/// Deposit expiry as a unix timestamp, for EVM router deposits
	pub expiry: u64,
}

/// The single wire encoding a message lowers to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "family")]
pub enum EncodedTx {
	CosmosDeposit(CosmosDeposit),
	Evm {
		tx: EvmTransactionRequest,
		#[serde(skip_serializing_if = "Option::is_none")]
		allowance: Option<Erc20Allowance>,
	},
	Utxo(UtxoSpend),
	Xrp(XrpPayment),
	Tron(TronTransaction),
}

impl EncodedTx {
	pub fn family(&self) -> ChainFamily {
		match self {
			EncodedTx::CosmosDeposit(_) => ChainFamily::Cosmos,
			EncodedTx::Evm { .. } => ChainFamily::Evm,
			EncodedTx::Utxo(_) => ChainFamily::Utxo,
			EncodedTx::Xrp(_) => ChainFamily::Xrp,
			EncodedTx::Tron(_) => ChainFamily::Tron,
		}
	}
}

impl SwapMessage {
	pub fn new(sell_asset: Asset, amount: u128, memo: impl Into<String>) -> Self {
		Self {
			sell_asset,
			amount,
			memo: memo.into(),
		}
	}

	/// Lower into the single wire format for the account's chain family.
	pub fn lower(&self, account: &Account, ctx: &LoweringContext) -> Result<EncodedTx, MessageError> {
		match account.network.family() {
			ChainFamily::Cosmos => self.to_encode_object(account).map(EncodedTx::CosmosDeposit),
			ChainFamily::Evm => self
				.to_transaction_request(account, ctx.inbound.as_ref(), ctx.expiry)
				.map(|(tx, allowance)| EncodedTx::Evm { tx, allowance }),
			ChainFamily::Utxo => self
				.to_psbt(account, &ctx.utxos, ctx.inbound.as_ref(), ctx.fee_rate)
				.map(EncodedTx::Utxo),
			ChainFamily::Xrp => self
				.to_xrp_payment(account, ctx.inbound.as_ref())
				.map(EncodedTx::Xrp),
			ChainFamily::Tron => self
				.to_tron_tx(account, ctx.inbound.as_ref())
				.map(EncodedTx::Tron),
		}
	}

	/// Cosmos lowering: a deposit message embedding chain, memo and funds.
	///
	/// Deposits are a Thorchain message type; calling this for any other
	/// network is a programming error.
	pub fn to_encode_object(&self, account: &Account) -> Result<CosmosDeposit, MessageError> {
		if account.network != Chain::Thor {
			return Err(MessageError::UnsupportedOperation {
				operation: "to_encode_object",
				network: account.network,
			});
		}

		Ok(CosmosDeposit::new(
			&account.address,
			&self.sell_asset.id.to_string(),
			self.amount,
			&self.memo,
		))
	}

	/// EVM lowering: a calldata/value transaction request plus, for ERC-20
	/// sell assets, the allowance the caller must have approved before the
	/// main transaction can be broadcast.
	pub fn to_transaction_request(
		&self,
		account: &Account,
		inbound: Option<&InboundAddress>,
		expiry: u64,
	) -> Result<(EvmTransactionRequest, Option<Erc20Allowance>), MessageError> {
		let chain = account.network;
		if chain.family() != ChainFamily::Evm {
			return Err(MessageError::UnsupportedOperation {
				operation: "to_transaction_request",
				network: chain,
			});
		}

		let inbound = inbound.ok_or(MessageError::MissingInboundAddress { chain })?;

		match &self.sell_asset.id.contract {
			None => {
				let value =
					evm::denormalize_amount(self.amount, registry::properties(chain).decimals);
				let tx = EvmTransactionRequest {
					from: account.address.clone(),
					to: inbound.address.clone(),
					value,
					data: format!("0x{}", hex::encode(self.memo.as_bytes())),
				};
				Ok((tx, None))
			},
			Some(contract) => {
				let router = inbound
					.router
					.as_deref()
					.ok_or(MessageError::MissingRouter { chain })?;

				let vault = parse(chain, &inbound.address)?;
				let token = parse(chain, contract)?;
				let decimals = u32::from(self.sell_asset.decimals);
				let token_amount = evm::denormalize_amount(self.amount, decimals);

				let call = depositWithExpiryCall {
					vault,
					asset: token,
					amount: token_amount,
					memo: self.memo.clone(),
					expiry: alloy_primitives::U256::from(expiry),
				};

				let tx = EvmTransactionRequest {
					from: account.address.clone(),
					to: router.to_string(),
					value: alloy_primitives::U256::ZERO,
					data: format!("0x{}", hex::encode(call.abi_encode())),
				};

				let allowance = Erc20Allowance {
					contract: contract.clone(),
					spender: router.to_string(),
					amount: token_amount.try_into().unwrap_or(u128::MAX),
					decimals: self.sell_asset.decimals,
					symbol: self.sell_asset.id.ticker.clone(),
				};

				Ok((tx, Some(allowance)))
			},
		}
	}

	/// UTXO lowering: select inputs from the account's UTXO set, compute
	/// fee and change, and return the spend plan with the memo destined
	/// for an OP_RETURN output.
	pub fn to_psbt(
		&self,
		account: &Account,
		utxos: &[Utxo],
		inbound: Option<&InboundAddress>,
		fee_rate: Option<u64>,
	) -> Result<UtxoSpend, MessageError> {
		let chain = account.network;
		if chain.family() != ChainFamily::Utxo {
			return Err(MessageError::UnsupportedOperation {
				operation: "to_psbt",
				network: chain,
			});
		}

		let inbound = inbound.ok_or(MessageError::MissingInboundAddress { chain })?;
		let rate = fee_rate
			.or(inbound.gas_rate)
			.ok_or(MessageError::MissingGasRate { chain })?;

		utxo::build_spend(
			utxos,
			&inbound.address,
			&account.address,
			self.amount,
			rate,
			&self.memo,
		)
	}

	/// XRP lowering: a ledger payment with the memo attached.
	pub fn to_xrp_payment(
		&self,
		account: &Account,
		inbound: Option<&InboundAddress>,
	) -> Result<XrpPayment, MessageError> {
		let chain = account.network;
		if chain.family() != ChainFamily::Xrp {
			return Err(MessageError::UnsupportedOperation {
				operation: "to_xrp_payment",
				network: chain,
			});
		}

		let inbound = inbound.ok_or(MessageError::MissingInboundAddress { chain })?;
		Ok(XrpPayment::new(
			&account.address,
			&inbound.address,
			self.amount,
			&self.memo,
		))
	}

	/// TRON lowering: a native or TRC-20 transfer.
	pub fn to_tron_tx(
		&self,
		account: &Account,
		inbound: Option<&InboundAddress>,
	) -> Result<TronTransaction, MessageError> {
		let chain = account.network;
		if chain.family() != ChainFamily::Tron {
			return Err(MessageError::UnsupportedOperation {
				operation: "to_tron_tx",
				network: chain,
			});
		}

		let inbound = inbound.ok_or(MessageError::MissingInboundAddress { chain })?;
		let tx = match &self.sell_asset.id.contract {
			None => TronTransaction::native(
				&account.address,
				&inbound.address,
				self.amount,
				&self.memo,
			),
			Some(contract) => TronTransaction::trc20(
				&account.address,
				&inbound.address,
				contract,
				self.amount,
				u32::from(self.sell_asset.decimals),
				&self.memo,
			),
		};
		Ok(tx)
	}
}

fn parse(chain: Chain, raw: &str) -> Result<alloy_primitives::Address, MessageError> {
	evm::parse_address(raw).map_err(|_| MessageError::InvalidAddress {
		chain,
		address: raw.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utxo::Utxo;
	use uswap_types::{AssetId, WalletProvider};

	fn native_asset(chain: Chain, ticker: &str) -> Asset {
		Asset::new(AssetId::new(chain, ticker), 8)
	}

	fn inbound(chain: Chain, address: &str) -> InboundAddress {
		InboundAddress {
			chain,
			address: address.to_string(),
			router: None,
			gas_rate: Some(10),
			gas_rate_units: None,
			halted: false,
			dust_threshold: None,
		}
	}

	#[test]
	fn test_encode_object_requires_thorchain() {
		let msg = SwapMessage::new(native_asset(Chain::Thor, "RUNE"), 100_000_000, "=:BTC.BTC:bc1q");

		let thor = Account::new("thor1signer", Chain::Thor, WalletProvider::Keystore);
		let deposit = msg.to_encode_object(&thor).unwrap();
		assert_eq!(deposit.msg.signer, "thor1signer");

		let eth = Account::new("0xabc", Chain::Eth, WalletProvider::Metamask);
		let err = msg.to_encode_object(&eth).unwrap_err();
		assert!(matches!(
			err,
			MessageError::UnsupportedOperation {
				operation: "to_encode_object",
				network: Chain::Eth,
			}
		));

		// a non-Thorchain cosmos network is rejected too
		let gaia = Account::new("cosmos1abc", Chain::Gaia, WalletProvider::Keplr);
		assert!(msg.to_encode_object(&gaia).is_err());
	}

	#[test]
	fn test_evm_native_lowering_scales_value() {
		let msg = SwapMessage::new(native_asset(Chain::Eth, "ETH"), 150_000_000, "=:THOR.RUNE:thor1x");
		let account = Account::new(
			"0x1111111111111111111111111111111111111111",
			Chain::Eth,
			WalletProvider::Metamask,
		);
		let inbound = inbound(Chain::Eth, "0x2222222222222222222222222222222222222222");

		let (tx, allowance) = msg
			.to_transaction_request(&account, Some(&inbound), 0)
			.unwrap();
		// 1.5 in 8dp -> 1.5e18 wei
		assert_eq!(tx.value, alloy_primitives::U256::from(1_500_000_000_000_000_000u128));
		assert_eq!(tx.to, inbound.address);
		assert!(tx.data.starts_with("0x"));
		assert!(allowance.is_none());
	}

	#[test]
	fn test_evm_token_lowering_returns_allowance() {
		let usdt = Asset::new(
			AssetId::with_contract(
				Chain::Eth,
				"USDT",
				"0xdAC17F958D2ee523a2206206994597C13D831ec7",
			),
			6,
		);
		let msg = SwapMessage::new(usdt, 500_000_000, "=:BTC.BTC:bc1q"); // 5 USDT
		let account = Account::new(
			"0x1111111111111111111111111111111111111111",
			Chain::Eth,
			WalletProvider::Metamask,
		);
		let mut inbound = inbound(Chain::Eth, "0x2222222222222222222222222222222222222222");
		inbound.router = Some("0x3333333333333333333333333333333333333333".to_string());

		let (tx, allowance) = msg
			.to_transaction_request(&account, Some(&inbound), 1_700_000_000)
			.unwrap();
		let allowance = allowance.unwrap();

		assert_eq!(tx.to, inbound.router.clone().unwrap());
		assert_eq!(tx.value, alloy_primitives::U256::ZERO);
		assert_eq!(allowance.amount, 5_000_000); // token units at 6 decimals
		assert_eq!(allowance.spender, inbound.router.unwrap());
		assert_eq!(allowance.symbol, "USDT");
	}

	#[test]
	fn test_evm_token_without_router_fails() {
		let usdt = Asset::new(
			AssetId::with_contract(
				Chain::Eth,
				"USDT",
				"0xdAC17F958D2ee523a2206206994597C13D831ec7",
			),
			6,
		);
		let msg = SwapMessage::new(usdt, 1, "m");
		let account = Account::new(
			"0x1111111111111111111111111111111111111111",
			Chain::Eth,
			WalletProvider::Metamask,
		);
		let err = msg
			.to_transaction_request(&account, Some(&inbound(Chain::Eth, "0x2222222222222222222222222222222222222222")), 0)
			.unwrap_err();
		assert!(matches!(err, MessageError::MissingRouter { chain: Chain::Eth }));
	}

	#[test]
	fn test_lower_dispatches_by_family() {
		let utxos = vec![Utxo {
			txid: "a".to_string(),
			vout: 0,
			value: 10_000_000,
			script_pubkey: None,
		}];

		let msg = SwapMessage::new(native_asset(Chain::Btc, "BTC"), 1_000_000, "=:THOR.RUNE:thor1x");
		let account = Account::new("bc1qsender", Chain::Btc, WalletProvider::Keystore);
		let ctx = LoweringContext {
			inbound: Some(inbound(Chain::Btc, "bc1qvault")),
			utxos,
			fee_rate: None,
			expiry: 0,
		};

		let encoded = msg.lower(&account, &ctx).unwrap();
		assert_eq!(encoded.family(), ChainFamily::Utxo);
		match encoded {
			EncodedTx::Utxo(spend) => {
				assert_eq!(spend.recipient, "bc1qvault");
				assert_eq!(spend.memo, "=:THOR.RUNE:thor1x");
			},
			other => panic!("expected UTXO lowering, got {:?}", other),
		}
	}

	#[test]
	fn test_lower_missing_inbound_fails() {
		let msg = SwapMessage::new(native_asset(Chain::Xrp, "XRP"), 100, "m");
		let account = Account::new("rSender", Chain::Xrp, WalletProvider::Ledger);
		let err = msg.lower(&account, &LoweringContext::default()).unwrap_err();
		assert!(matches!(
			err,
			MessageError::MissingInboundAddress { chain: Chain::Xrp }
		));
	}

	#[test]
	fn test_tron_lowering() {
		let msg = SwapMessage::new(native_asset(Chain::Tron, "TRX"), 200_000_000, "memo");
		let account = Account::new("TOwnerAddr", Chain::Tron, WalletProvider::Keystore);
		let tx = msg
			.to_tron_tx(&account, Some(&inbound(Chain::Tron, "TVaultAddr")))
			.unwrap();
		assert_eq!(tx.amount, 2_000_000); // sun
		assert_eq!(tx.to_address, "TVaultAddr");
	}
}
