//! Event discovery for the intent indexer.
//!
//! This crate owns everything between the chain-event source and the
//! reconciliation handlers: the contract ABIs, decoding of raw logs, and the
//! dynamic watch registry through which a fixed set of factory-level sources
//! grows to cover every intent account the factory deploys.

use alloy_primitives::Address;
use async_trait::async_trait;
use indexer_types::ChainId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod abi;
pub mod decode;
pub mod router;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod storage;
}

pub use decode::{decode_log, RawLog};
pub use router::{LogRouter, StaticSources};

/// Errors that can occur during discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
	/// A log carried a known signature but its body could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The watch registry backend failed.
	#[error("Watch registry error: {0}")]
	Registry(String),
}

/// Kind of dynamic data source created for a watched address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchTemplate {
	/// A deployed intent account, which reports its own native transfers.
	Intent,
}

impl WatchTemplate {
	pub fn as_str(&self) -> &'static str {
		match self {
			WatchTemplate::Intent => "intent",
		}
	}
}

/// Trait defining the interface for watch registries.
///
/// Registration must be idempotent: registering the same address twice is
/// harmless.
#[async_trait]
pub trait WatchInterface: Send + Sync {
	/// Requests delivery of future events emitted by `address`.
	async fn register(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<(), DiscoveryError>;

	/// Checks whether `address` has been registered for `template`.
	async fn is_watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<bool, DiscoveryError>;

	/// All addresses registered for `template` on a chain.
	async fn watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError>;
}

/// Service wrapping the configured watch registry.
pub struct WatchService {
	backend: Box<dyn WatchInterface>,
}

impl WatchService {
	pub fn new(backend: Box<dyn WatchInterface>) -> Self {
		Self { backend }
	}

	pub async fn register(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<(), DiscoveryError> {
		debug!(?template, %chain_id, %address, "registering dynamic watch");
		self.backend.register(template, chain_id, address).await
	}

	pub async fn is_watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<bool, DiscoveryError> {
		self.backend.is_watched(template, chain_id, address).await
	}

	pub async fn watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError> {
		self.backend.watched(template, chain_id).await
	}
}
