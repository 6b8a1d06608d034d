//! Fixtures shared by the handler and engine tests.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use indexer_discovery::{DiscoveryError, WatchInterface, WatchService, WatchTemplate};
use indexer_storage::implementations::memory::MemoryStorage;
use indexer_storage::StorageService;
use indexer_types::{
	BroadcastPayload, ChainId, EntityKeys, EventContext, Intent, IntentFlow, IntentPayload,
	KeyScope, TerminalPolicy, TokenOption,
};
use std::sync::{Arc, Mutex};

use crate::handlers::{BroadcastHandler, FundingAggregator, IntentHandler};

type Registration = (WatchTemplate, ChainId, Address);

/// Watch registry that remembers every registration, duplicates included.
#[derive(Clone, Default)]
pub struct RecordingWatches {
	registrations: Arc<Mutex<Vec<Registration>>>,
}

impl RecordingWatches {
	pub fn registrations(&self) -> Vec<Registration> {
		self.registrations.lock().unwrap().clone()
	}
}

#[async_trait]
impl WatchInterface for RecordingWatches {
	async fn register(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<(), DiscoveryError> {
		self.registrations
			.lock()
			.unwrap()
			.push((template, chain_id, address));
		Ok(())
	}

	async fn is_watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
		address: Address,
	) -> Result<bool, DiscoveryError> {
		Ok(self
			.registrations()
			.contains(&(template, chain_id, address)))
	}

	async fn watched(
		&self,
		template: WatchTemplate,
		chain_id: ChainId,
	) -> Result<Vec<Address>, DiscoveryError> {
		Ok(self
			.registrations()
			.into_iter()
			.filter(|(t, c, _)| *t == template && *c == chain_id)
			.map(|(_, _, address)| address)
			.collect())
	}
}

pub struct Fixture {
	pub storage: Arc<StorageService>,
	pub watches: Arc<WatchService>,
	pub recorder: RecordingWatches,
	pub keys: EntityKeys,
	pub flow: IntentFlow,
}

impl Fixture {
	pub fn new(flow: IntentFlow, scope: KeyScope) -> Self {
		let recorder = RecordingWatches::default();
		Self {
			storage: Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			watches: Arc::new(WatchService::new(Box::new(recorder.clone()))),
			recorder,
			keys: EntityKeys::new(scope),
			flow,
		}
	}

	pub fn intent_handler(&self) -> IntentHandler {
		IntentHandler::new(
			self.storage.clone(),
			self.watches.clone(),
			self.keys,
			self.flow,
		)
	}

	pub fn funding_aggregator(&self) -> FundingAggregator {
		FundingAggregator::new(self.storage.clone(), self.keys)
	}

	pub fn broadcast_handler(&self, terminal: TerminalPolicy) -> BroadcastHandler {
		BroadcastHandler::new(self.storage.clone(), self.keys, terminal)
	}

	/// The fixture intent as stored on base.
	pub async fn intent(&self) -> Option<Intent> {
		self.storage
			.load(&self.keys.intent(ChainId::BASE, &intent_address()))
			.await
			.unwrap()
	}
}

pub fn intent_address() -> Address {
	address!("00000000000000000000000000000000000000aa")
}

pub fn usdc() -> Address {
	address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")
}

pub fn native() -> Address {
	Address::ZERO
}

pub fn declarer() -> Address {
	Address::repeat_byte(0xde)
}

pub fn creator() -> Address {
	Address::repeat_byte(0xc7)
}

pub fn sender() -> Address {
	Address::repeat_byte(0x5e)
}

/// A context on base whose transaction hash is derived from the block.
pub fn context(block: u64, log_index: u64, timestamp: u64) -> EventContext {
	EventContext {
		network: "base".to_string(),
		chain_id: None,
		block_number: block,
		block_timestamp: timestamp,
		transaction_hash: B256::left_padding_from(&block.to_be_bytes()),
		log_index,
	}
}

pub fn funding_id(ctx: &EventContext) -> String {
	EntityKeys::default().funding(&ctx.transaction_hash, ctx.log_index)
}

pub fn payload(options: &[(Address, u64)]) -> IntentPayload {
	IntentPayload {
		source_chain: U256::from(8453u64),
		destination_chain: U256::from(42161u64),
		destination_recipient: Address::repeat_byte(0x11),
		coordinator: Address::repeat_byte(0x22),
		bridger: Address::repeat_byte(0x33),
		refund_address: Address::repeat_byte(0x44),
		nonce: U256::from(1u64),
		expiration_timestamp: U256::from(2_000_000_000u64),
		needs_relay: false,
		metadata: Bytes::new(),
		bridge_token_out_options: options
			.iter()
			.map(|(token, amount)| TokenOption {
				token: *token,
				amount: U256::from(*amount),
			})
			.collect(),
	}
}

pub fn broadcast_payload() -> BroadcastPayload {
	BroadcastPayload {
		broadcast_id: B256::repeat_byte(0xb0),
		sender: sender(),
		source_chain: U256::from(8453u64),
		destination_chain: U256::from(10u64),
		recipient: Address::repeat_byte(0x11),
		refund_address: Address::repeat_byte(0x44),
		broadcaster: Address::repeat_byte(0x55),
		broadcasting_contract: Address::repeat_byte(0x66),
		is_live: true,
		deposits: vec![TokenOption {
			token: usdc(),
			amount: U256::from(500u64),
		}],
		bridge_token_out_options: vec![
			TokenOption {
				token: usdc(),
				amount: U256::from(490u64),
			},
			TokenOption {
				token: native(),
				amount: U256::from(1u64),
			},
		],
	}
}
