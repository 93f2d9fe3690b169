//! Wallet connection boundary: the connector trait supplied by the wallet
//! layer and the multi-provider connect ceiling

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tokio::time::{timeout, Duration};
use tracing::warn;

use uswap_types::constants::CONNECT_TIMEOUT;
use uswap_types::{Account, Chain, WalletProvider};

/// Wallet connect exceeded the ceiling; every in-flight attempt is
/// treated as failed even if it later resolves.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("wallet connection timed out after {elapsed_ms}ms")]
pub struct ConnectionTimeoutError {
	pub elapsed_ms: u64,
	pub providers: Vec<WalletProvider>,
}

/// Wallet connection failure.
#[derive(Debug, Error)]
pub enum ConnectError {
	#[error(transparent)]
	Timeout(#[from] ConnectionTimeoutError),

	#[error("{provider:?} connection failed: {reason}")]
	Provider {
		provider: WalletProvider,
		reason: String,
	},
}

/// Implemented by the external wallet layer; supplies connected accounts
/// (one per provider/network pair) and signs on its own side.
#[async_trait]
pub trait WalletConnector: Send + Sync {
	async fn connect(
		&self,
		provider: WalletProvider,
		networks: &[Chain],
	) -> Result<Vec<Account>, ConnectError>;
}

/// Connect every selected provider concurrently under one hard ceiling.
/// Any single provider failing fails the operation, matching the
/// all-or-nothing semantics of the connect dialog.
pub async fn connect_all(
	connector: &dyn WalletConnector,
	providers: &[WalletProvider],
	networks: &[Chain],
) -> Result<Vec<Account>, ConnectError> {
	connect_all_with_timeout(connector, providers, networks, CONNECT_TIMEOUT).await
}

/// [`connect_all`] with an explicit ceiling, for tests and embedders with
/// different patience.
pub async fn connect_all_with_timeout(
	connector: &dyn WalletConnector,
	providers: &[WalletProvider],
	networks: &[Chain],
	ceiling: Duration,
) -> Result<Vec<Account>, ConnectError> {
	let attempts = providers
		.iter()
		.map(|provider| connector.connect(*provider, networks));

	match timeout(ceiling, join_all(attempts)).await {
		Ok(results) => {
			let mut accounts = Vec::new();
			for result in results {
				accounts.extend(result?);
			}
			Ok(accounts)
		},
		Err(_) => {
			warn!(
				ceiling_ms = ceiling.as_millis() as u64,
				"wallet connection ceiling reached"
			);
			Err(ConnectError::Timeout(ConnectionTimeoutError {
				elapsed_ms: ceiling.as_millis() as u64,
				providers: providers.to_vec(),
			}))
		},
	}
}

/// Resolve the account to use on `chain`.
///
/// A hand-entered destination that still validates for the chain is kept;
/// otherwise the account from the previously selected wallet provider is
/// preferred, then any connected account on the chain.
pub fn resolve_destination(
	accounts: &[Account],
	chain: Chain,
	current: Option<&Account>,
) -> Option<Account> {
	if let Some(current) = current {
		if current.provider.is_none() && uswap_chains::validate_address(chain, &current.address) {
			return Some(Account::custom(current.address.clone(), chain));
		}
	}
	uswap_types::accounts::resolve_for_chain(accounts, chain, current).cloned()
}

#[cfg(test)]
mod tests {
	use super::*;

	struct FakeConnector {
		delay: Duration,
		fail: bool,
	}

	#[async_trait]
	impl WalletConnector for FakeConnector {
		async fn connect(
			&self,
			provider: WalletProvider,
			networks: &[Chain],
		) -> Result<Vec<Account>, ConnectError> {
			tokio::time::sleep(self.delay).await;
			if self.fail {
				return Err(ConnectError::Provider {
					provider,
					reason: "user rejected".to_string(),
				});
			}
			Ok(networks
				.iter()
				.map(|network| Account::new(format!("addr-{}", network), *network, provider))
				.collect())
		}
	}

	#[tokio::test]
	async fn test_connect_all_collects_accounts() {
		let connector = FakeConnector {
			delay: Duration::from_millis(1),
			fail: false,
		};
		let accounts = connect_all_with_timeout(
			&connector,
			&[WalletProvider::Keystore, WalletProvider::Ledger],
			&[Chain::Btc, Chain::Thor],
			Duration::from_secs(1),
		)
		.await
		.unwrap();
		assert_eq!(accounts.len(), 4);
	}

	#[tokio::test]
	async fn test_ceiling_fails_all_attempts() {
		let connector = FakeConnector {
			delay: Duration::from_secs(60),
			fail: false,
		};
		let err = connect_all_with_timeout(
			&connector,
			&[WalletProvider::Metamask],
			&[Chain::Eth],
			Duration::from_millis(20),
		)
		.await
		.unwrap_err();

		match err {
			ConnectError::Timeout(timeout) => {
				assert_eq!(timeout.providers, vec![WalletProvider::Metamask]);
			},
			other => panic!("expected timeout, got {:?}", other),
		}
	}

	#[test]
	fn test_resolve_destination_keeps_valid_custom_address() {
		let accounts = vec![Account::new("0xabc", Chain::Eth, WalletProvider::Metamask)];
		let custom = Account::custom("thor1g98cy3n9mmjrpn0sxmn63lztelera37n8n67c0", Chain::Thor);

		let resolved = resolve_destination(&accounts, Chain::Thor, Some(&custom)).unwrap();
		assert_eq!(resolved.address, custom.address);
		assert_eq!(resolved.provider, None);

		// custom address no longer valid for the new chain: fall back to
		// connected accounts
		let resolved = resolve_destination(&accounts, Chain::Eth, Some(&custom)).unwrap();
		assert_eq!(resolved.address, "0xabc");
	}

	#[tokio::test]
	async fn test_single_provider_failure_fails_connect() {
		let connector = FakeConnector {
			delay: Duration::from_millis(1),
			fail: true,
		};
		let err = connect_all_with_timeout(
			&connector,
			&[WalletProvider::Keplr],
			&[Chain::Gaia],
			Duration::from_secs(1),
		)
		.await
		.unwrap_err();
		assert!(matches!(err, ConnectError::Provider { .. }));
	}
}
