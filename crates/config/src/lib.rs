//! uswap Config
//!
//! Layered settings for the swap orchestration core: a config file plus
//! `USWAP_`-prefixed environment overrides.

pub mod loader;
pub mod settings;

pub use loader::load_config;
pub use settings::{
	AffiliateSettings, ChainSettings, FeeSettings, LogFormat, LoggingSettings, PollingSettings,
	ProviderSettings, Settings, TimeoutSettings,
};
