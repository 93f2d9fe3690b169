//! Configuration settings structures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uswap_types::{Chain, ProviderName, ProviderRuntimeConfig};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub providers: HashMap<ProviderName, ProviderSettings>,
	pub chains: HashMap<Chain, ChainSettings>,
	pub timeouts: TimeoutSettings,
	pub polling: PollingSettings,
	pub fees: FeeSettings,
	pub affiliate: Option<AffiliateSettings>,
	pub logging: LoggingSettings,
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
	pub endpoint: String,
	pub timeout_ms: u64,
	pub enabled: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub headers: Option<HashMap<String, String>>,
}

impl ProviderSettings {
	pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Self {
		Self {
			endpoint: endpoint.into(),
			timeout_ms,
			enabled: true,
			headers: None,
		}
	}

	pub fn runtime_config(&self, provider: ProviderName) -> ProviderRuntimeConfig {
		ProviderRuntimeConfig {
			provider,
			endpoint: self.endpoint.clone(),
			timeout_ms: self.timeout_ms,
			headers: self.headers.clone(),
		}
	}
}

/// Per-chain endpoints consumed by the balance and fee layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
	/// RPC endpoint (EVM), LCD endpoint (Cosmos) or explorer API base
	/// (UTXO/XRP/TRON)
	pub endpoint: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub api_key: Option<String>,
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
	/// Per-provider quote timeout in milliseconds
	pub per_provider_ms: u64,
	/// Global aggregation timeout in milliseconds
	pub global_ms: u64,
	/// Wallet connection ceiling in milliseconds
	pub connect_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			per_provider_ms: 8_000,
			global_ms: 15_000,
			connect_ms: 20_000,
		}
	}
}

/// Status polling intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
	/// Live tracking interval in seconds
	pub live_secs: u64,
	/// Shareable tracking-view interval in seconds
	pub shared_secs: u64,
}

impl Default for PollingSettings {
	fn default() -> Self {
		Self {
			live_secs: 5,
			shared_secs: 10,
		}
	}
}

/// Fee estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSettings {
	/// Surcharge applied to raw fee estimates, in basis points
	pub surcharge_bps: u64,
}

impl Default for FeeSettings {
	fn default() -> Self {
		Self {
			surcharge_bps: uswap_types::constants::FEE_SURCHARGE_BPS as u64,
		}
	}
}

/// Affiliate parameters attached to quote requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateSettings {
	pub address: String,
	pub bps: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}

/// Log format options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

impl Default for Settings {
	fn default() -> Self {
		let mut providers = HashMap::new();
		providers.insert(
			ProviderName::Thorchain,
			ProviderSettings::new("https://thornode.ninerealms.com", 8_000),
		);
		providers.insert(
			ProviderName::ThorchainStreaming,
			ProviderSettings::new("https://thornode.ninerealms.com", 8_000),
		);
		providers.insert(
			ProviderName::Maya,
			ProviderSettings::new("https://mayanode.mayachain.info", 8_000),
		);
		providers.insert(
			ProviderName::Chainflip,
			ProviderSettings::new("https://chainflip-swap.chainflip.io", 8_000),
		);

		let mut chains = HashMap::new();
		chains.insert(
			Chain::Eth,
			ChainSettings {
				endpoint: "https://eth.llamarpc.com".to_string(),
				api_key: None,
			},
		);
		chains.insert(
			Chain::Bsc,
			ChainSettings {
				endpoint: "https://bsc-dataseed.binance.org".to_string(),
				api_key: None,
			},
		);
		chains.insert(
			Chain::Avax,
			ChainSettings {
				endpoint: "https://api.avax.network/ext/bc/C/rpc".to_string(),
				api_key: None,
			},
		);
		chains.insert(
			Chain::Base,
			ChainSettings {
				endpoint: "https://mainnet.base.org".to_string(),
				api_key: None,
			},
		);

		Self {
			providers,
			chains,
			timeouts: TimeoutSettings::default(),
			polling: PollingSettings::default(),
			fees: FeeSettings::default(),
			affiliate: None,
			logging: LoggingSettings::default(),
		}
	}
}

impl Settings {
	/// Providers that are enabled in configuration, with their runtime
	/// configs.
	pub fn enabled_providers(&self) -> Vec<(ProviderName, ProviderRuntimeConfig)> {
		let mut enabled: Vec<_> = self
			.providers
			.iter()
			.filter(|(_, settings)| settings.enabled)
			.map(|(name, settings)| (*name, settings.runtime_config(*name)))
			.collect();
		// HashMap iteration order is arbitrary; keep startup logs and
		// query order stable.
		enabled.sort_by_key(|(name, _)| name.to_string());
		enabled
	}

	/// Endpoint for a chain, when configured.
	pub fn chain_endpoint(&self, chain: Chain) -> Option<&ChainSettings> {
		self.chains.get(&chain)
	}
}
