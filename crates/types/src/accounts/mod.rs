//! Wallet accounts supplied by the external wallet layer

use serde::{Deserialize, Serialize};

use crate::networks::Chain;

/// Wallet software that can supply accounts and sign transactions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletProvider {
	Keystore,
	Ledger,
	Metamask,
	Keplr,
	WalletConnect,
	Xdefi,
	Station,
}

/// A connected account. Created by the wallet layer, consumed read-only by
/// the orchestration core; one per connected (provider, network) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub address: String,
	pub network: Chain,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub provider: Option<WalletProvider>,
}

impl Account {
	pub fn new(address: impl Into<String>, network: Chain, provider: WalletProvider) -> Self {
		Self {
			address: address.into(),
			network,
			provider: Some(provider),
		}
	}

	/// A destination entered by hand rather than supplied by a wallet.
	pub fn custom(address: impl Into<String>, network: Chain) -> Self {
		Self {
			address: address.into(),
			network,
			provider: None,
		}
	}
}

/// Pick the account to use for an asset on `chain`, preferring the account
/// from the previously selected wallet provider when it also covers that
/// chain.
pub fn resolve_for_chain<'a>(
	accounts: &'a [Account],
	chain: Chain,
	previous: Option<&Account>,
) -> Option<&'a Account> {
	if let Some(prev) = previous {
		if let Some(account) = accounts.iter().find(|a| {
			a.provider == prev.provider && a.address == prev.address && a.network == chain
		}) {
			return Some(account);
		}
	}
	accounts.iter().find(|a| a.network == chain)
}
