//! Swap transaction records, lifecycle status and tracking payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod track;

pub use track::{TrackParams, TrackResponse};

use crate::assets::AssetId;
use crate::providers::ProviderName;
use crate::serde_helpers::{option_string_amount, string_amount};

/// Lifecycle status of a swap transaction.
///
/// `NotStarted` means the user's deposit to the inbound address has not
/// been observed on-chain yet; `Swapping` is the mid-flight sub-state of
/// multi-leg routes. Terminal statuses are never left once reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
	NotStarted,
	Pending,
	Swapping,
	Completed,
	Failed,
	Expired,
	Refunded,
	Unknown,
}

impl TxStatus {
	/// Whether this status ends the lifecycle; polling stops permanently
	/// once a terminal status is reached.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			TxStatus::Completed | TxStatus::Failed | TxStatus::Expired | TxStatus::Refunded
		)
	}

	/// Whether the transaction is still in flight.
	pub fn is_pending(&self) -> bool {
		matches!(
			self,
			TxStatus::NotStarted | TxStatus::Pending | TxStatus::Swapping
		)
	}
}

/// One sub-transfer within a multi-hop swap execution. Leg statuses are
/// shown for transparency only; the record's own status comes from the
/// provider's top-level stage and is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLeg {
	pub from_asset: AssetId,
	pub to_asset: AssetId,
	pub chain_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hash: Option<String>,
	pub status: TxStatus,
}

impl TransactionLeg {
	/// Explorer link for this leg, when its chain and hash are known.
	pub fn explorer_url(&self) -> Option<String> {
		let chain = crate::networks::Chain::from_chain_id(&self.chain_id)?;
		self.hash.as_deref().map(|h| chain.explorer_tx_url(h))
	}
}

/// A broadcast swap, persisted indefinitely in local storage. Created when
/// the deposit is broadcast; mutated only by the lifecycle tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
	pub hash: String,
	pub created_at: DateTime<Utc>,
	pub from_asset: AssetId,
	#[serde(with = "string_amount")]
	pub from_amount: u128,
	pub to_asset: AssetId,
	#[serde(with = "option_string_amount", default)]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_amount: Option<u128>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_address: Option<String>,
	pub provider: ProviderName,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub provider_swap_id: Option<String>,
	pub status: TxStatus,
	/// Raw provider status payload from the last poll
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
	#[serde(default)]
	pub legs: Vec<TransactionLeg>,
}

impl TransactionRecord {
	pub fn new(
		hash: impl Into<String>,
		from_asset: AssetId,
		from_amount: u128,
		to_asset: AssetId,
		provider: ProviderName,
	) -> Self {
		Self {
			hash: hash.into(),
			created_at: Utc::now(),
			from_asset,
			from_amount,
			to_asset,
			to_amount: None,
			to_address: None,
			provider,
			provider_swap_id: None,
			status: TxStatus::NotStarted,
			details: None,
			legs: Vec::new(),
		}
	}

	/// Tracking request for this record, as the lifecycle tracker and the
	/// shareable tracking URL both consume it.
	pub fn track_params(&self) -> TrackParams {
		TrackParams {
			provider: self.provider,
			provider_swap_id: self.provider_swap_id.clone(),
			hash: Some(self.hash.clone()),
			chain_id: self.from_asset.chain.chain_id().to_string(),
			from_asset: self.from_asset.clone(),
			from_address: None,
			from_amount: self.from_amount,
			to_asset: self.to_asset.clone(),
			to_address: self.to_address.clone().unwrap_or_default(),
			to_amount: self.to_amount.unwrap_or_default(),
			deposit_address: None,
		}
	}

	/// Fold a freshly polled provider response into this record. The
	/// response's top-level status wins outright; legs and details are
	/// replaced wholesale.
	pub fn apply_track_response(&mut self, response: &TrackResponse) {
		self.status = response.status;
		self.legs = response.legs.clone();
		if let Some(amount) = response.to_amount {
			self.to_amount = Some(amount);
		}
		if let Some(details) = &response.details {
			self.details = Some(details.clone());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::networks::Chain;

	fn record() -> TransactionRecord {
		TransactionRecord::new(
			"ABC123",
			AssetId::new(Chain::Btc, "BTC"),
			50_000_000,
			AssetId::new(Chain::Thor, "RUNE"),
			ProviderName::Thorchain,
		)
	}

	#[test]
	fn test_terminal_and_pending_partition() {
		for status in [
			TxStatus::NotStarted,
			TxStatus::Pending,
			TxStatus::Swapping,
			TxStatus::Completed,
			TxStatus::Failed,
			TxStatus::Expired,
			TxStatus::Refunded,
			TxStatus::Unknown,
		] {
			// Unknown is neither terminal nor pending: keep polling eligibility
			// decisions to the tracker.
			if status == TxStatus::Unknown {
				assert!(!status.is_terminal());
				assert!(!status.is_pending());
			} else {
				assert_ne!(status.is_terminal(), status.is_pending());
			}
		}
	}

	#[test]
	fn test_top_level_status_is_authoritative_over_legs() {
		let mut tx = record();
		tx.status = TxStatus::Pending;

		let response = TrackResponse {
			status: TxStatus::Completed,
			from_address: None,
			to_address: None,
			to_amount: Some(100_000_000_000),
			legs: vec![TransactionLeg {
				from_asset: AssetId::new(Chain::Btc, "BTC"),
				to_asset: AssetId::new(Chain::Thor, "RUNE"),
				chain_id: "thorchain-1".to_string(),
				hash: Some("DEF".to_string()),
				// stale leg still pending; must not hold the record back
				status: TxStatus::Pending,
			}],
			details: None,
		};

		tx.apply_track_response(&response);
		assert_eq!(tx.status, TxStatus::Completed);
		assert_eq!(tx.legs.len(), 1);
		assert_eq!(tx.legs[0].status, TxStatus::Pending);
		assert_eq!(tx.to_amount, Some(100_000_000_000));
	}

	#[test]
	fn test_leg_explorer_url() {
		let leg = TransactionLeg {
			from_asset: AssetId::new(Chain::Eth, "ETH"),
			to_asset: AssetId::new(Chain::Eth, "ETH"),
			chain_id: "1".to_string(),
			hash: Some("0xdeadbeef".to_string()),
			status: TxStatus::Completed,
		};
		assert_eq!(
			leg.explorer_url().unwrap(),
			"https://etherscan.io/tx/0xdeadbeef"
		);
	}

	#[test]
	fn test_status_serde_snake_case() {
		assert_eq!(
			serde_json::to_string(&TxStatus::NotStarted).unwrap(),
			"\"not_started\""
		);
	}
}
