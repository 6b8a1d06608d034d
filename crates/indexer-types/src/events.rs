//! Decoded inbound events and their provenance.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::chains::{resolve_chain_id, ChainId};

/// An accepted (token, amount) pair as carried by event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOption {
	pub token: Address,
	pub amount: U256,
}

/// The intent parameters carried by declaration and creation events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPayload {
	pub source_chain: U256,
	pub destination_chain: U256,
	pub destination_recipient: Address,
	pub coordinator: Address,
	pub bridger: Address,
	pub refund_address: Address,
	pub nonce: U256,
	pub expiration_timestamp: U256,
	pub needs_relay: bool,
	#[serde(default)]
	pub metadata: Bytes,
	pub bridge_token_out_options: Vec<TokenOption>,
}

/// Payload of a relay-broadcast declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPayload {
	pub broadcast_id: B256,
	pub sender: Address,
	pub source_chain: U256,
	pub destination_chain: U256,
	pub recipient: Address,
	pub refund_address: Address,
	pub broadcaster: Address,
	pub broadcasting_contract: Address,
	pub is_live: bool,
	pub deposits: Vec<TokenOption>,
	pub bridge_token_out_options: Vec<TokenOption>,
}

/// Every event kind the indexer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexerEvent {
	IntentDeclared {
		intent_address: Address,
		declarer: Address,
		intent: IntentPayload,
	},
	IntentCreated {
		intent_address: Address,
		creator: Address,
		intent: IntentPayload,
	},
	/// The coordinator started bridging a funded intent.
	IntentStarted { intent_address: Address },
	/// ERC-20 `Transfer` emitted by `token`.
	Erc20Transfer {
		token: Address,
		from: Address,
		to: Address,
		value: U256,
	},
	/// Native-asset transfer reported by the intent account itself.
	NativeTransfer {
		intent_address: Address,
		from: Address,
		to: Address,
		amount: U256,
	},
	IntentBroadcasted(BroadcastPayload),
	BroadcastExecuted { broadcast_id: B256 },
	BroadcastCancelled { broadcast_id: B256 },
}

impl IndexerEvent {
	/// Short name used in log output.
	pub fn kind(&self) -> &'static str {
		match self {
			IndexerEvent::IntentDeclared { .. } => "intent_declared",
			IndexerEvent::IntentCreated { .. } => "intent_created",
			IndexerEvent::IntentStarted { .. } => "intent_started",
			IndexerEvent::Erc20Transfer { .. } => "erc20_transfer",
			IndexerEvent::NativeTransfer { .. } => "native_transfer",
			IndexerEvent::IntentBroadcasted(_) => "intent_broadcasted",
			IndexerEvent::BroadcastExecuted { .. } => "broadcast_executed",
			IndexerEvent::BroadcastCancelled { .. } => "broadcast_cancelled",
		}
	}
}

/// Where and when an event was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
	/// Logical network name of the delivering data source.
	pub network: String,
	/// Explicit per-deployment chain id. Takes precedence over `network`.
	#[serde(default)]
	pub chain_id: Option<ChainId>,
	pub block_number: u64,
	pub block_timestamp: u64,
	pub transaction_hash: B256,
	pub log_index: u64,
}

impl EventContext {
	/// The chain id of the delivering context, [`ChainId::UNKNOWN`] if it
	/// cannot be resolved.
	pub fn resolved_chain_id(&self) -> ChainId {
		self.chain_id
			.unwrap_or_else(|| resolve_chain_id(&self.network))
	}
}

/// A decoded event together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
	pub context: EventContext,
	pub event: IndexerEvent,
}
