//! Configuration types.

use alloy_primitives::Address;
use indexer_types::{ChainId, IntentFlow, KeyScope, TerminalPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub indexer: IndexerSettings,
	#[serde(default)]
	pub storage: StorageConfig,
	/// Deployments keyed by logical network name.
	#[serde(default)]
	pub networks: BTreeMap<String, NetworkConfig>,
}

impl Config {
	/// Finds the network deployed on `chain_id`.
	pub fn network_for_chain(&self, chain_id: ChainId) -> Option<(&str, &NetworkConfig)> {
		self.networks
			.iter()
			.find(|(_, network)| network.chain_id == chain_id)
			.map(|(name, network)| (name.as_str(), network))
	}
}

/// Reconciliation policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSettings {
	#[serde(default = "default_name")]
	pub name: String,
	#[serde(default)]
	pub intent_flow: IntentFlow,
	#[serde(default)]
	pub key_scope: KeyScope,
	#[serde(default)]
	pub broadcast_terminal: TerminalPolicy,
}

impl Default for IndexerSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			intent_flow: IntentFlow::default(),
			key_scope: KeyScope::default(),
			broadcast_terminal: TerminalPolicy::default(),
		}
	}
}

fn default_name() -> String {
	"intent-indexer".to_string()
}

/// Entity store backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
	/// `memory` or `file`.
	#[serde(default = "default_backend")]
	pub backend: String,
	/// Backend-specific parameters, passed to the backend factory as is.
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_backend(),
			config: empty_table(),
		}
	}
}

fn default_backend() -> String {
	"memory".to_string()
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}

/// One chain deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	pub chain_id: ChainId,
	pub intent_factory: Address,
	/// Coordinator contract that also emits `IntentStarted`.
	#[serde(default)]
	pub coordinator: Option<Address>,
	#[serde(default)]
	pub broadcaster: Option<Address>,
	/// First block to index.
	#[serde(default)]
	pub start_block: u64,
	/// ERC-20 contracts whose transfers can fund intents.
	#[serde(default)]
	pub tokens: Vec<Address>,
}
