//! Mock provider adapters for integration tests
//!
//! Scriptable quote amounts, configurable delay, failure switch and call
//! tracking, without any network dependency.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use uswap::types::{
	ProviderError, ProviderInfo, ProviderName, ProviderResult, ProviderRuntimeConfig, QuoteParams,
	Route, SwapProviderAdapter, TrackParams, TrackResponse, TxStatus,
};

/// Mock swap-route provider.
#[derive(Debug)]
pub struct MockProviderAdapter {
	info: ProviderInfo,
	/// Expected buy amounts, one route per entry
	pub quotes: Vec<u128>,
	pub delay: Duration,
	pub fail: bool,
	/// Statuses replayed by successive track calls
	pub track_script: Vec<TxStatus>,
	quote_calls: Arc<AtomicUsize>,
	track_calls: Arc<AtomicUsize>,
}

impl MockProviderAdapter {
	pub fn new(provider: ProviderName, quotes: Vec<u128>) -> Self {
		Self {
			info: ProviderInfo::new(provider, format!("Mock {}", provider), "test"),
			quotes,
			delay: Duration::ZERO,
			fail: false,
			track_script: vec![TxStatus::Pending],
			quote_calls: Arc::new(AtomicUsize::new(0)),
			track_calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn failing(provider: ProviderName) -> Self {
		let mut adapter = Self::new(provider, Vec::new());
		adapter.fail = true;
		adapter
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub fn with_track_script(mut self, script: Vec<TxStatus>) -> Self {
		self.track_script = script;
		self
	}

	pub fn quote_calls(&self) -> usize {
		self.quote_calls.load(Ordering::SeqCst)
	}

	pub fn track_calls(&self) -> usize {
		self.track_calls.load(Ordering::SeqCst)
	}

	fn route(&self, params: &QuoteParams, expected: u128) -> Route {
		Route {
			sell_asset: params.sell_asset.clone(),
			buy_asset: params.buy_asset.clone(),
			sell_amount: params.sell_amount,
			expected_buy_amount: expected,
			providers: vec![self.info.provider],
			fees: Vec::new(),
			estimated_time_secs: Some(60),
			target_address: None,
			provider_swap_id: None,
			inbound_address: Some("mock-inbound".to_string()),
			memo: Some(format!("=:{}:{}", params.buy_asset, "mock-dest")),
		}
	}
}

#[async_trait]
impl SwapProviderAdapter for MockProviderAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_routes(
		&self,
		params: &QuoteParams,
		_config: &ProviderRuntimeConfig,
	) -> ProviderResult<Vec<Route>> {
		self.quote_calls.fetch_add(1, Ordering::SeqCst);

		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		if self.fail {
			return Err(ProviderError::Provider {
				message: format!("{} configured to fail", self.info.provider),
			});
		}

		Ok(self
			.quotes
			.iter()
			.map(|expected| self.route(params, *expected))
			.collect())
	}

	async fn track(
		&self,
		_params: &TrackParams,
		_config: &ProviderRuntimeConfig,
	) -> ProviderResult<TrackResponse> {
		let call = self.track_calls.fetch_add(1, Ordering::SeqCst);
		let status = *self
			.track_script
			.get(call)
			.unwrap_or_else(|| self.track_script.last().expect("track script is empty"));

		Ok(TrackResponse {
			status,
			from_address: None,
			to_address: None,
			to_amount: None,
			legs: Vec::new(),
			details: None,
		})
	}
}
