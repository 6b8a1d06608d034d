//! Persisted entity shapes.
//!
//! These structs are the only schema the indexer owns. Each one is stored
//! under its own namespace, keyed by the id derived in [`crate::keys`].

use alloy_primitives::{Address, Bytes, U256};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::chains::ChainId;

/// A value the entity store can load and upsert by id.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
	/// Storage namespace for this entity type.
	const NAMESPACE: &'static str;

	fn id(&self) -> &str;
}

/// Lifecycle of an [`Intent`].
///
/// Variants are declared in lifecycle order. Transitions only ever move
/// forward, see [`IntentStatus::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
	Declared,
	Pending,
	Funded,
	Initiated,
}

impl IntentStatus {
	/// Moves to `next` if that is a forward transition. Returns whether the
	/// status changed.
	pub fn advance(&mut self, next: IntentStatus) -> bool {
		if next > *self {
			*self = next;
			true
		} else {
			false
		}
	}
}

/// A declared cross-chain transfer request awaiting funding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
	pub id: String,
	pub intent_address: Address,
	/// Chain the intent account lives on.
	pub chain_id: ChainId,
	pub source_chain: U256,
	pub destination_chain: U256,
	pub destination_recipient: Address,
	pub coordinator: Address,
	pub bridger: Address,
	pub refund_address: Address,
	pub nonce: U256,
	pub expiration_timestamp: U256,
	pub needs_relay: bool,
	pub metadata: Bytes,
	pub status: IntentStatus,
	pub created_at: u64,
	pub funded_at: Option<u64>,
	pub total_funded: U256,
	pub declarer: Option<Address>,
	pub creator: Option<Address>,
	/// Ids of the accepted payout options, in declaration order.
	pub bridge_token_out_options: Vec<String>,
	/// Ids of the funding transactions already credited to `total_funded`.
	///
	/// Grows by one id per credited transfer and is rewritten with the intent
	/// on every credit, so intents funded by many small transfers carry a
	/// proportionally large record. Funding usually takes one or two
	/// transfers.
	#[serde(default)]
	pub funding_transactions: Vec<String>,
}

impl Entity for Intent {
	const NAMESPACE: &'static str = "intents";

	fn id(&self) -> &str {
		&self.id
	}
}

/// One accepted (token, amount) payout option of an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
	pub id: String,
	pub intent: String,
	pub token: Address,
	pub amount: U256,
}

impl Entity for TokenAmount {
	const NAMESPACE: &'static str = "token_amounts";

	fn id(&self) -> &str {
		&self.id
	}
}

/// One observed transfer credited toward an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingTransaction {
	pub id: String,
	pub intent: String,
	/// Id of the [`Token`] record.
	pub token: String,
	pub token_address: Address,
	pub amount: U256,
	pub sender: Address,
	pub chain_id: ChainId,
	pub transaction_hash: String,
	pub block_number: u64,
	pub timestamp: u64,
}

impl Entity for FundingTransaction {
	const NAMESPACE: &'static str = "funding_transactions";

	fn id(&self) -> &str {
		&self.id
	}
}

/// Canonical record of a token seen in a funding transfer. The native asset
/// uses the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub id: String,
	pub address: Address,
	pub chain_id: ChainId,
	pub symbol: Option<String>,
	pub name: Option<String>,
	pub decimals: Option<u8>,
}

impl Token {
	pub fn is_native(&self) -> bool {
		self.address == Address::ZERO
	}
}

impl Entity for Token {
	const NAMESPACE: &'static str = "tokens";

	fn id(&self) -> &str {
		&self.id
	}
}

/// Lifecycle of a [`Broadcast`]. Both `Executed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastStatus {
	Pending,
	Executed,
	Cancelled,
}

impl BroadcastStatus {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, BroadcastStatus::Pending)
	}
}

/// A relay-broadcast request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
	pub id: String,
	pub sender: Address,
	pub source_chain: U256,
	pub destination_chain: U256,
	pub destination_recipient: Address,
	pub refund_address: Address,
	pub broadcaster: Address,
	pub broadcasting_contract: Address,
	pub is_live: bool,
	pub status: BroadcastStatus,
	pub chain_id: ChainId,
	pub block_number: u64,
	pub block_timestamp: u64,
	pub transaction_hash: String,
	pub deposits: Vec<String>,
	pub bridge_token_out_options: Vec<String>,
}

impl Entity for Broadcast {
	const NAMESPACE: &'static str = "broadcasts";

	fn id(&self) -> &str {
		&self.id
	}
}

/// Collateral deposited with a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastDeposit {
	pub id: String,
	pub broadcast: String,
	pub token: Address,
	pub amount: U256,
}

impl Entity for BroadcastDeposit {
	const NAMESPACE: &'static str = "broadcast_deposits";

	fn id(&self) -> &str {
		&self.id
	}
}

/// Accepted payout option of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTokenAmount {
	pub id: String,
	pub broadcast: String,
	pub token: Address,
	pub amount: U256,
}

impl Entity for BroadcastTokenAmount {
	const NAMESPACE: &'static str = "broadcast_token_amounts";

	fn id(&self) -> &str {
		&self.id
	}
}
