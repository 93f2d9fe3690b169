//! Configuration loading utilities

use config::{Config, ConfigError, Environment, File};

use crate::Settings;

/// Load configuration from the config file, then apply `USWAP_`-prefixed
/// environment overrides (e.g. `USWAP_LOGGING__LEVEL=debug`).
pub fn load_config() -> Result<Settings, ConfigError> {
	let s = Config::builder()
		.add_source(File::with_name("config/config").required(false))
		.add_source(Environment::with_prefix("USWAP").separator("__"))
		.build()?;

	s.try_deserialize()
}
