//! uswap Adapters
//!
//! Provider adapter implementations and the registry the aggregator
//! resolves them through.

pub mod chainflip_adapter;
pub mod maya_adapter;
pub mod thorchain_adapter;

pub use chainflip_adapter::ChainflipAdapter;
pub use maya_adapter::MayaAdapter;
pub use thorchain_adapter::ThorchainAdapter;

use std::collections::HashMap;
use std::sync::Arc;

use uswap_types::{ProviderName, SwapProviderAdapter};

/// Registry of provider adapters, keyed by provider identity. Streaming
/// route variants resolve to their base provider's adapter.
#[derive(Default)]
pub struct AdapterRegistry {
	adapters: HashMap<ProviderName, Arc<dyn SwapProviderAdapter>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry pre-populated with every built-in adapter.
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		registry.register(Arc::new(ThorchainAdapter::new()));
		registry.register(Arc::new(MayaAdapter::new()));
		registry.register(Arc::new(ChainflipAdapter::new()));
		registry
	}

	/// Register an adapter under its own provider id, replacing any
	/// previous registration.
	pub fn register(&mut self, adapter: Arc<dyn SwapProviderAdapter>) {
		self.adapters.insert(adapter.id(), adapter);
	}

	/// Resolve the adapter serving `provider` (streaming variants map to
	/// their base adapter).
	pub fn get(&self, provider: ProviderName) -> Option<Arc<dyn SwapProviderAdapter>> {
		self.adapters.get(&provider.adapter_key()).cloned()
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_cover_all_base_providers() {
		let registry = AdapterRegistry::with_defaults();
		assert_eq!(registry.len(), 3);
		assert!(registry.get(ProviderName::Thorchain).is_some());
		assert!(registry.get(ProviderName::Maya).is_some());
		assert!(registry.get(ProviderName::Chainflip).is_some());
	}

	#[test]
	fn test_streaming_variants_resolve_to_base_adapter() {
		let registry = AdapterRegistry::with_defaults();
		let adapter = registry.get(ProviderName::ThorchainStreaming).unwrap();
		assert_eq!(adapter.id(), ProviderName::Thorchain);
	}
}
