//! Priced swap routes returned by the quote aggregation layer

use serde::{Deserialize, Serialize};

use crate::assets::AssetId;
use crate::providers::ProviderName;
use crate::serde_helpers::string_amount;

/// Fee component classification within a route's fee breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
	Inbound,
	Outbound,
	Liquidity,
	Affiliate,
	Network,
}

/// One fee component, tagged by the asset it is denominated in.
/// Amounts are base units of that asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteFee {
	#[serde(rename = "type")]
	pub kind: FeeKind,
	pub asset: AssetId,
	#[serde(with = "string_amount")]
	pub amount: u128,
}

/// One complete, priced execution path for a swap. Immutable snapshot;
/// amounts are 8-decimal base units carried as integers end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
	pub sell_asset: AssetId,
	pub buy_asset: AssetId,
	#[serde(with = "string_amount")]
	pub sell_amount: u128,
	#[serde(with = "string_amount")]
	pub expected_buy_amount: u128,
	/// Ordered provider path; more than one entry for swap-of-swaps routes.
	pub providers: Vec<ProviderName>,
	#[serde(default)]
	pub fees: Vec<RouteFee>,
	/// Estimated total execution time in seconds
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_time_secs: Option<u64>,
	/// Contract that must be approved to spend an ERC-20 sell asset
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target_address: Option<String>,
	/// Provider-side identifier for tracking this swap
	#[serde(skip_serializing_if = "Option::is_none")]
	pub provider_swap_id: Option<String>,
	/// Per-swap deposit address when the provider assigns one
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inbound_address: Option<String>,
	/// Memo to attach to the deposit transaction
	#[serde(skip_serializing_if = "Option::is_none")]
	pub memo: Option<String>,
}

impl Route {
	/// The provider that received the query for this route (head of the
	/// execution path).
	pub fn primary_provider(&self) -> Option<ProviderName> {
		self.providers.first().copied()
	}

	/// Total of all fee components denominated in `asset`.
	pub fn total_fees_in(&self, asset: &AssetId) -> u128 {
		self.fees
			.iter()
			.filter(|f| &f.asset == asset)
			.map(|f| f.amount)
			.sum()
	}
}

/// The ranked route list for one quote request plus the user's selection.
///
/// Routes arrive ranked best-price-first; selection defaults to index 0 and
/// can be re-pointed at any other returned route without re-querying.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteSet {
	routes: Vec<Route>,
	selected: usize,
}

impl RouteSet {
	pub fn new(routes: Vec<Route>) -> Self {
		Self {
			routes,
			selected: 0,
		}
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn selected_index(&self) -> usize {
		self.selected
	}

	/// The active route, best-price by default.
	pub fn selected(&self) -> Option<&Route> {
		self.routes.get(self.selected)
	}

	/// Re-point the active route. Out-of-range indices are ignored and the
	/// current selection kept.
	pub fn select(&mut self, index: usize) {
		if index < self.routes.len() {
			self.selected = index;
		}
	}
}
