//! In-memory watch registry.

use crate::{DiscoveryError, WatchInterface, WatchTemplate};
use alloy_primitives::Address;
use async_trait::async_trait;
use dashmap::DashSet;
use indexer_types::ChainId;

/// Watch registry backed by a concurrent set.
#[derive(Debug, Default)]
pub struct MemoryWatchRegistry {
	entries: DashSet<(WatchTemplate, ChainId, Address)>,
}

impl MemoryWatchRegistry {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl WatchInterface for MemoryWatchRegistry {
	async fn register(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<(), DiscoveryError> {
		self.entries.insert((template, chain_id, address));
		Ok(())
	}

	async fn is_watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<bool, DiscoveryError> {
		Ok(self.entries.contains(&(template, chain_id, address)))
	}

	async fn watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError> {
		let mut addresses: Vec<Address> = self
			.entries
			.iter()
			.filter(|entry| entry.0 == template && entry.1 == chain_id)
			.map(|entry| entry.2)
			.collect();
		addresses.sort();
		Ok(addresses)
	}
}

/// Factory for the in-memory registry. It takes no parameters.
pub fn create_registry(_config: &toml::Value) -> Box<dyn WatchInterface> {
	Box::new(MemoryWatchRegistry::new())
}
