//! Configuration loading from files and environment.

use crate::types::*;
use crate::ConfigError;
use alloy_primitives::Address;
use indexer_types::{resolve_chain_id, ChainId};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const STORAGE_BACKENDS: &[&str] = &["memory", "file"];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load, override from the environment and validate a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)?;
		let mut config = Self::from_toml(&contents)?;

		Self::apply_env_overrides(&mut config, std::env::vars())?;
		Self::validate(&config)?;
		Ok(config)
	}

	/// Parse a TOML string without validating it.
	pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
		toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
	}

	/// Apply `INDEXER_*` overrides.
	///
	/// - `INDEXER_STORAGE_BACKEND`: storage backend name
	/// - `INDEXER_STORAGE_PATH`: `storage_path` of the backend
	/// - `INDEXER_START_BLOCK_<CHAIN_ID>`: start block of that chain's network
	pub fn apply_env_overrides<I>(config: &mut Config, vars: I) -> Result<(), ConfigError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			if key == "INDEXER_STORAGE_BACKEND" {
				debug!("Overriding storage backend from environment");
				config.storage.backend = value;
			} else if key == "INDEXER_STORAGE_PATH" {
				debug!("Overriding storage path from environment");
				if let Some(table) = config.storage.config.as_table_mut() {
					table.insert("storage_path".to_string(), toml::Value::String(value));
				}
			} else if let Some(chain) = key.strip_prefix("INDEXER_START_BLOCK_") {
				let chain_id: ChainId = chain
					.parse()
					.map_err(|_| ConfigError::Validation(format!("Invalid chain id in {}", key)))?;
				let block = value
					.parse()
					.map_err(|_| ConfigError::Validation(format!("Invalid block in {}", key)))?;
				if let Some(network) = config
					.networks
					.values_mut()
					.find(|network| network.chain_id == chain_id)
				{
					debug!("Overriding start block for chain {} from environment", chain_id);
					network.start_block = block;
				}
			}
		}
		Ok(())
	}

	/// Validate configuration
	pub fn validate(config: &Config) -> Result<(), ConfigError> {
		if !STORAGE_BACKENDS.contains(&config.storage.backend.as_str()) {
			return Err(ConfigError::Validation(format!(
				"Unknown storage backend '{}'",
				config.storage.backend
			)));
		}

		let mut chain_ids = HashSet::new();
		for (name, network) in &config.networks {
			if !network.chain_id.is_known() {
				return Err(ConfigError::Validation(format!(
					"Network '{}' has no chain id",
					name
				)));
			}

			let resolved = resolve_chain_id(name);
			if resolved.is_known() && resolved != network.chain_id {
				return Err(ConfigError::Validation(format!(
					"Network '{}' is chain {} but configured as {}",
					name, resolved, network.chain_id
				)));
			}

			if !chain_ids.insert(network.chain_id) {
				return Err(ConfigError::Validation(format!(
					"Chain {} configured more than once",
					network.chain_id
				)));
			}

			if network.intent_factory == Address::ZERO {
				return Err(ConfigError::Validation(format!(
					"Network '{}' has no intent factory",
					name
				)));
			}

			if network.tokens.contains(&Address::ZERO) {
				return Err(ConfigError::Validation(format!(
					"Network '{}' lists the zero address as a token",
					name
				)));
			}
		}

		Ok(())
	}
}
