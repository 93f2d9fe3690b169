//! uswap Types
//!
//! Shared models and traits for the uswap swap orchestration core.
//! This crate contains all domain models organized by business entity.

pub mod accounts;
pub mod assets;
pub mod constants;
pub mod networks;
pub mod providers;
pub mod routes;
pub mod serde_helpers;
pub mod storage;
pub mod transactions;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

// Re-export commonly used types for convenience
pub use networks::{Chain, ChainFamily};

pub use assets::{Asset, AssetError, AssetId};

pub use accounts::{Account, WalletProvider};

pub use routes::{FeeKind, Route, RouteFee, RouteSet};

pub use providers::{
	Affiliate, InboundAddress, ProviderError, ProviderInfo, ProviderName, ProviderResult,
	ProviderRuntimeConfig, QuoteParams, SwapProviderAdapter,
};

pub use transactions::{
	TrackParams, TrackResponse, TransactionLeg, TransactionRecord, TxStatus,
};

pub use storage::{
	PreferenceStorage, Storage, StorageError, StorageResult, SwapPreferences, TransactionStorage,
};
