//! Shared constants for amount handling, fees and polling

use std::time::Duration;

/// Every balance and amount in the domain is normalized to this precision,
/// regardless of the underlying chain's native decimal count.
pub const NORMALIZED_DECIMALS: u32 = 8;

/// Basis point denominator used for slippage and fee math.
pub const BPS_DENOM: u128 = 10_000;

/// Flat surcharge applied to every raw network fee estimate, in basis
/// points. Absorbs gas-price movement between simulation and broadcast.
pub const FEE_SURCHARGE_BPS: u128 = 1_000;

/// Ceiling for multi-provider wallet connection attempts.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Poll interval for live status tracking of the user's own transactions.
pub const LIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll interval for the public shareable tracking view.
pub const SHARED_POLL_INTERVAL: Duration = Duration::from_secs(10);
