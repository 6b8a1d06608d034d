//! Watch registry persisted through an entity store backend.
//!
//! Registrations survive restarts when the backend does, so intent accounts
//! declared in an earlier run keep delivering their native transfers. Each
//! registration is a marker key, plus one index key per template and chain
//! listing the registered addresses.

use crate::{DiscoveryError, WatchInterface, WatchTemplate};
use alloy_primitives::Address;
use async_trait::async_trait;
use indexer_storage::{StorageError, StorageInterface};
use indexer_types::{hex_id, ChainId};

fn registry_error(e: impl std::fmt::Display) -> DiscoveryError {
	DiscoveryError::Registry(e.to_string())
}

pub struct StorageWatchRegistry {
	backend: Box<dyn StorageInterface>,
}

impl StorageWatchRegistry {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn marker_key(template: WatchTemplate, chain_id: ChainId, address: &Address) -> String {
		format!("watches:{}-{}-{}", template.as_str(), chain_id, hex_id(address))
	}

	fn index_key(template: WatchTemplate, chain_id: ChainId) -> String {
		format!("watch_index:{}-{}", template.as_str(), chain_id)
	}

	async fn load_index(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError> {
		match self.backend.get_bytes(&Self::index_key(template, chain_id)).await {
			Ok(bytes) => serde_json::from_slice(&bytes).map_err(registry_error),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(registry_error(e)),
		}
	}
}

#[async_trait]
impl WatchInterface for StorageWatchRegistry {
	async fn register(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<(), DiscoveryError> {
		let marker = Self::marker_key(template, chain_id, &address);
		if self.backend.exists(&marker).await.map_err(registry_error)? {
			return Ok(());
		}

		// Index first: a marker is only written once the address is listed.
		let mut index = self.load_index(template, chain_id).await?;
		if !index.contains(&address) {
			index.push(address);
			let bytes = serde_json::to_vec(&index).map_err(registry_error)?;
			self.backend
				.set_bytes(&Self::index_key(template, chain_id), bytes)
				.await
				.map_err(registry_error)?;
		}

		self.backend
			.set_bytes(&marker, Vec::new())
			.await
			.map_err(registry_error)
	}

	async fn is_watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<bool, DiscoveryError> {
		self.backend
			.exists(&Self::marker_key(template, chain_id, &address))
			.await
			.map_err(registry_error)
	}

	async fn watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError> {
		let mut addresses = self.load_index(template, chain_id).await?;
		addresses.sort();
		Ok(addresses)
	}
}
