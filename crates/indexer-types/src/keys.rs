//! Entity key derivation.
//!
//! All entity ids are derived here so that handlers agree on them. Child ids
//! are always built from the parent id, so a chain-scoped parent yields
//! chain-scoped children.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::chains::ChainId;

/// How address-derived keys are qualified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScope {
	/// The lowercase hex address is the key.
	#[default]
	Address,
	/// The key is `{chainId}:{address}`, which keeps intent accounts that
	/// reuse an address on two chains apart.
	Chain,
}

/// Lowercase, `0x`-prefixed hex rendering used for every byte-derived id.
pub fn hex_id(bytes: impl AsRef<[u8]>) -> String {
	format!("0x{}", hex::encode(bytes.as_ref()))
}

/// Derives entity keys according to a [`KeyScope`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityKeys {
	scope: KeyScope,
}

impl EntityKeys {
	pub fn new(scope: KeyScope) -> Self {
		Self { scope }
	}

	pub fn scope(&self) -> KeyScope {
		self.scope
	}

	fn scoped(&self, chain_id: ChainId, address: &Address) -> String {
		match self.scope {
			KeyScope::Address => hex_id(address),
			KeyScope::Chain => format!("{}:{}", chain_id, hex_id(address)),
		}
	}

	pub fn intent(&self, chain_id: ChainId, address: &Address) -> String {
		self.scoped(chain_id, address)
	}

	pub fn token(&self, chain_id: ChainId, address: &Address) -> String {
		self.scoped(chain_id, address)
	}

	/// `{intentId}-{index}`
	pub fn token_amount(&self, intent_id: &str, index: usize) -> String {
		format!("{}-{}", intent_id, index)
	}

	/// `{transactionHash}-{logIndex}`
	pub fn funding(&self, transaction_hash: &B256, log_index: u64) -> String {
		format!("{}-{}", hex_id(transaction_hash), log_index)
	}

	pub fn broadcast(&self, broadcast_id: &B256) -> String {
		hex_id(broadcast_id)
	}

	/// `{broadcastId}-{index}`
	pub fn broadcast_deposit(&self, broadcast_id: &str, index: usize) -> String {
		format!("{}-{}", broadcast_id, index)
	}

	/// `{broadcastId}-out-{index}`
	pub fn broadcast_token_amount(&self, broadcast_id: &str, index: usize) -> String {
		format!("{}-out-{}", broadcast_id, index)
	}
}
