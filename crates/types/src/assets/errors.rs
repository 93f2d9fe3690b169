//! Error types for asset parsing and catalog handling

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
	#[error("invalid asset identifier: {identifier}")]
	InvalidIdentifier { identifier: String },

	#[error("unknown chain '{chain}' in asset identifier: {identifier}")]
	UnknownChain { identifier: String, chain: String },
}
