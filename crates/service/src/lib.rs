//! uswap Service
//!
//! The orchestration layer: quote aggregation and selection, balance
//! caching, fee simulation, transaction lifecycle tracking and the wallet
//! connection ceiling.

pub mod aggregator;
pub mod balance;
pub mod simulation;
pub mod tracker;
pub mod wallet;

pub use aggregator::{rank_routes, AggregatorService, QuoteKey, QuoteSession};
pub use balance::BalanceService;
pub use simulation::{PendingApproval, Simulation, SimulationService};
pub use tracker::{PollMode, TransactionTracker};
pub use wallet::{
	connect_all, connect_all_with_timeout, resolve_destination, ConnectError,
	ConnectionTimeoutError, WalletConnector,
};
