//! Error types for provider adapter operations

use serde_json::Value;
use thiserror::Error;

/// Result type for provider adapter operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A single provider's failure. Never fails the aggregation as a whole;
/// the aggregator logs it and continues with the healthy providers.
#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("HTTP request failed: {0}")]
	Http(String),

	#[error("HTTP {status}: {body}")]
	Status { status: u16, body: String },

	#[error("provider returned error: {message}")]
	Provider { message: String },

	#[error("timeout after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("invalid response: {reason}")]
	InvalidResponse { reason: String },

	#[error("provider is disabled: {provider}")]
	Disabled { provider: String },

	#[error("unsupported operation: {operation} for provider {provider}")]
	UnsupportedOperation { operation: String, provider: String },
}

impl ProviderError {
	/// Build an error from a non-2xx response body, extracting the first
	/// human-readable message from the provider's error payload when one
	/// is present.
	///
	/// Understood shapes, tried in order:
	/// `{"providerErrors": [{"message": ...}]}`, `{"message": ...}`,
	/// `{"error": ...}`.
	pub fn from_error_body(status: u16, body: &str) -> Self {
		if let Ok(value) = serde_json::from_str::<Value>(body) {
			if let Some(message) = extract_message(&value) {
				return ProviderError::Provider { message };
			}
		}
		ProviderError::Status {
			status,
			body: body.to_string(),
		}
	}

	/// The message to surface to a user, falling back to the generic
	/// display form.
	pub fn user_message(&self) -> String {
		match self {
			ProviderError::Provider { message } => message.clone(),
			other => other.to_string(),
		}
	}
}

fn extract_message(value: &Value) -> Option<String> {
	if let Some(errors) = value.get("providerErrors").and_then(Value::as_array) {
		if let Some(message) = errors
			.iter()
			.filter_map(|e| e.get("message").and_then(Value::as_str))
			.next()
		{
			return Some(message.to_string());
		}
	}
	if let Some(message) = value.get("message").and_then(Value::as_str) {
		return Some(message.to_string());
	}
	if let Some(message) = value.get("error").and_then(Value::as_str) {
		return Some(message.to_string());
	}
	None
}
