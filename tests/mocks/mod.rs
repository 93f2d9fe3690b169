//! Shared mocks for integration tests

pub mod adapters;

pub use adapters::MockProviderAdapter;
