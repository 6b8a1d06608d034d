//! Intent lifecycle handler.
//!
//! Creates the `Intent` aggregate with its `TokenAmount` options from
//! declaration and creation events, advances it on creation completion and
//! coordinator start, and registers each intent account for dynamic watching.

use alloy_primitives::{Address, U256};
use indexer_discovery::{WatchService, WatchTemplate};
use indexer_storage::StorageService;
use indexer_types::{
	EntityKeys, EventContext, Intent, IntentFlow, IntentPayload, IntentStatus, TokenAmount,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{IndexerError, Outcome, SkipReason};

/// Who emitted the event that first wrote the intent.
enum Origin {
	Declarer(Address),
	Creator(Address),
}

pub struct IntentHandler {
	storage: Arc<StorageService>,
	watches: Arc<WatchService>,
	keys: EntityKeys,
	flow: IntentFlow,
}

impl IntentHandler {
	pub fn new(
		storage: Arc<StorageService>,
		watches: Arc<WatchService>,
		keys: EntityKeys,
		flow: IntentFlow,
	) -> Self {
		Self {
			storage,
			watches,
			keys,
			flow,
		}
	}

	pub async fn on_declared(
		&self,
		ctx: &EventContext,
		intent_address: Address,
		declarer: Address,
		payload: &IntentPayload,
	) -> Result<Outcome, IndexerError> {
		let status = match self.flow {
			IntentFlow::Combined => IntentStatus::Pending,
			IntentFlow::Staged => IntentStatus::Declared,
		};
		self.create(ctx, intent_address, payload, status, Origin::Declarer(declarer))
			.await
	}

	pub async fn on_created(
		&self,
		ctx: &EventContext,
		intent_address: Address,
		creator: Address,
		payload: &IntentPayload,
	) -> Result<Outcome, IndexerError> {
		match self.flow {
			IntentFlow::Combined => {
				self.create(
					ctx,
					intent_address,
					payload,
					IntentStatus::Pending,
					Origin::Creator(creator),
				)
				.await
			}
			IntentFlow::Staged => self.complete_creation(ctx, intent_address, creator).await,
		}
	}

	/// The coordinator started bridging the intent.
	pub async fn on_started(
		&self,
		ctx: &EventContext,
		intent_address: Address,
	) -> Result<Outcome, IndexerError> {
		let id = self.keys.intent(ctx.resolved_chain_id(), &intent_address);
		let Some(mut intent) = self.storage.load::<Intent>(&id).await? else {
			debug!(intent = %id, "start for unknown intent dropped");
			return Ok(Outcome::Skipped(SkipReason::UnknownIntent));
		};

		if !intent.status.advance(IntentStatus::Initiated) {
			return Ok(Outcome::Skipped(SkipReason::NoTransition));
		}

		self.storage.upsert(&intent).await?;
		info!(intent = %id, "intent initiated");
		Ok(Outcome::Applied)
	}

	async fn create(
		&self,
		ctx: &EventContext,
		intent_address: Address,
		payload: &IntentPayload,
		status: IntentStatus,
		origin: Origin,
	) -> Result<Outcome, IndexerError> {
		let chain_id = ctx.resolved_chain_id();
		let id = self.keys.intent(chain_id, &intent_address);

		// Declaration and creation can both fire for one intent, and either can be redelivered.
		if self.storage.exists::<Intent>(&id).await? {
			info!(intent = %id, "intent already indexed, skipping");
			return Ok(Outcome::Skipped(SkipReason::DuplicateIntent));
		}

		let mut option_ids = Vec::with_capacity(payload.bridge_token_out_options.len());
		for (index, option) in payload.bridge_token_out_options.iter().enumerate() {
			let option_id = self.keys.token_amount(&id, index);
			self.storage
				.upsert(&TokenAmount {
					id: option_id.clone(),
					intent: id.clone(),
					token: option.token,
					amount: option.amount,
				})
				.await?;
			option_ids.push(option_id);
		}

		// Watched before the parent exists, so every stored intent has its account watched.
		self.watches
			.register(WatchTemplate::Intent, chain_id, intent_address)
			.await?;

		let (declarer, creator) = match origin {
			Origin::Declarer(declarer) => (Some(declarer), None),
			Origin::Creator(creator) => (None, Some(creator)),
		};

		let intent = Intent {
			id: id.clone(),
			intent_address,
			chain_id,
			source_chain: payload.source_chain,
			destination_chain: payload.destination_chain,
			destination_recipient: payload.destination_recipient,
			coordinator: payload.coordinator,
			bridger: payload.bridger,
			refund_address: payload.refund_address,
			nonce: payload.nonce,
			expiration_timestamp: payload.expiration_timestamp,
			needs_relay: payload.needs_relay,
			metadata: payload.metadata.clone(),
			status,
			created_at: ctx.block_timestamp,
			funded_at: None,
			total_funded: U256::ZERO,
			declarer,
			creator,
			bridge_token_out_options: option_ids,
			funding_transactions: Vec::new(),
		};
		self.storage.upsert(&intent).await?;

		info!(
			intent = %id,
			%chain_id,
			status = ?intent.status,
			options = intent.bridge_token_out_options.len(),
			"intent indexed"
		);
		Ok(Outcome::Applied)
	}

	async fn complete_creation(
		&self,
		ctx: &EventContext,
		intent_address: Address,
		creator: Address,
	) -> Result<Outcome, IndexerError> {
		let id = self.keys.intent(ctx.resolved_chain_id(), &intent_address);
		let Some(mut intent) = self.storage.load::<Intent>(&id).await? else {
			debug!(intent = %id, "creation for undeclared intent dropped");
			return Ok(Outcome::Skipped(SkipReason::UnknownIntent));
		};

		let advanced = intent.status.advance(IntentStatus::Pending);
		let first_creator = intent.creator.is_none();
		if first_creator {
			intent.creator = Some(creator);
		}
		if !advanced && !first_creator {
			return Ok(Outcome::Skipped(SkipReason::NoTransition));
		}

		self.storage.upsert(&intent).await?;
		info!(intent = %id, %creator, status = ?intent.status, "intent creation completed");
		Ok(Outcome::Applied)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;
	use indexer_types::{ChainId, KeyScope};

	#[tokio::test]
	async fn test_declaration_creates_intent_and_options_in_order() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Address);
		let handler = fixture.intent_handler();
		let payload = payload(&[(usdc(), 100), (native(), 7)]);

		let outcome = handler
			.on_declared(&context(1, 0, 1_000), intent_address(), declarer(), &payload)
			.await
			.unwrap();
		assert_eq!(outcome, Outcome::Applied);

		let intent = fixture.intent().await.unwrap();
		assert_eq!(intent.status, IntentStatus::Pending);
		assert_eq!(intent.total_funded, U256::ZERO);
		assert_eq!(intent.created_at, 1_000);
		assert_eq!(intent.chain_id, ChainId::BASE);
		assert_eq!(intent.declarer, Some(declarer()));
		assert_eq!(
			intent.bridge_token_out_options,
			vec![format!("{}-0", intent.id), format!("{}-1", intent.id)]
		);

		let second: TokenAmount = fixture
			.storage
			.load(&intent.bridge_token_out_options[1])
			.await
			.unwrap()
			.unwrap();
		assert_eq!(second.token, native());
		assert_eq!(second.amount, U256::from(7u64));
		assert_eq!(second.intent, intent.id);
	}

	#[tokio::test]
	async fn test_declaration_registers_dynamic_watch() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Address);
		fixture
			.intent_handler()
			.on_declared(
				&context(1, 0, 1_000),
				intent_address(),
				declarer(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();

		assert_eq!(
			fixture.recorder.registrations(),
			vec![(WatchTemplate::Intent, ChainId::BASE, intent_address())]
		);
	}

	#[tokio::test]
	async fn test_creation_after_declaration_is_noop() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Address);
		let handler = fixture.intent_handler();

		handler
			.on_declared(
				&context(1, 0, 1_000),
				intent_address(),
				declarer(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();
		let before = fixture.intent().await.unwrap();

		// A creation event with different options must not touch the existing intent.
		let outcome = handler
			.on_created(
				&context(2, 0, 2_000),
				intent_address(),
				creator(),
				&payload(&[(usdc(), 999), (usdc(), 1)]),
			)
			.await
			.unwrap();
		assert_eq!(outcome, Outcome::Skipped(SkipReason::DuplicateIntent));

		let after = fixture.intent().await.unwrap();
		assert_eq!(before, after);
		assert!(fixture
			.storage
			.load::<TokenAmount>(&format!("{}-1", after.id))
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_redelivered_declaration_is_noop() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Address);
		let handler = fixture.intent_handler();
		let options = payload(&[(usdc(), 100), (native(), 5)]);

		let first = handler
			.on_declared(&context(1, 0, 1_000), intent_address(), declarer(), &options)
			.await
			.unwrap();
		assert_eq!(first, Outcome::Applied);
		let intent = fixture.intent().await.unwrap();
		let registrations = fixture.recorder.registrations();
		let mut amounts = Vec::new();
		for id in &intent.bridge_token_out_options {
			amounts.push(
				fixture
					.storage
					.load::<TokenAmount>(id)
					.await
					.unwrap()
					.unwrap(),
			);
		}

		// same log delivered again
		let second = handler
			.on_declared(&context(1, 0, 1_000), intent_address(), declarer(), &options)
			.await
			.unwrap();
		assert_eq!(second, Outcome::Skipped(SkipReason::DuplicateIntent));

		assert_eq!(fixture.recorder.registrations(), registrations);
		assert_eq!(registrations.len(), 1);
		let after = fixture.intent().await.unwrap();
		assert_eq!(after, intent);
		for (id, amount) in after.bridge_token_out_options.iter().zip(&amounts) {
			let stored = fixture
				.storage
				.load::<TokenAmount>(id)
				.await
				.unwrap()
				.unwrap();
			assert_eq!(&stored, amount);
		}
		assert!(fixture
			.storage
			.load::<TokenAmount>(&format!("{}-2", after.id))
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_staged_flow_declares_then_creates() {
		let fixture = Fixture::new(IntentFlow::Staged, KeyScope::Address);
		let handler = fixture.intent_handler();

		handler
			.on_declared(
				&context(1, 0, 1_000),
				intent_address(),
				declarer(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();
		assert_eq!(
			fixture.intent().await.unwrap().status,
			IntentStatus::Declared
		);

		let outcome = handler
			.on_created(
				&context(2, 0, 2_000),
				intent_address(),
				creator(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();
		assert_eq!(outcome, Outcome::Applied);

		let intent = fixture.intent().await.unwrap();
		assert_eq!(intent.status, IntentStatus::Pending);
		assert_eq!(intent.creator, Some(creator()));
		assert_eq!(intent.declarer, Some(declarer()));
		// creation completion does not rewrite declaration-time fields
		assert_eq!(intent.created_at, 1_000);

		let again = handler
			.on_created(
				&context(2, 0, 2_000),
				intent_address(),
				creator(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();
		assert_eq!(again, Outcome::Skipped(SkipReason::NoTransition));
	}

	#[tokio::test]
	async fn test_staged_creation_for_unknown_intent_is_dropped() {
		let fixture = Fixture::new(IntentFlow::Staged, KeyScope::Address);
		let outcome = fixture
			.intent_handler()
			.on_created(
				&context(1, 0, 1_000),
				intent_address(),
				creator(),
				&payload(&[(usdc(), 100)]),
			)
			.await
			.unwrap();

		assert_eq!(outcome, Outcome::Skipped(SkipReason::UnknownIntent));
		assert!(fixture.intent().await.is_none());
		assert!(fixture.recorder.registrations().is_empty());
	}

	#[tokio::test]
	async fn test_creation_never_moves_status_backwards() {
		let fixture = Fixture::new(IntentFlow::Staged, KeyScope::Address);
		let handler = fixture.intent_handler();
		handler
			.on_declared(
				&context(1, 0, 1_000),
				intent_address(),
				declarer(),
				&payload(&[]),
			)
			.await
			.unwrap();

		let mut intent = fixture.intent().await.unwrap();
		intent.status = IntentStatus::Funded;
		fixture.storage.upsert(&intent).await.unwrap();

		handler
			.on_created(
				&context(2, 0, 2_000),
				intent_address(),
				creator(),
				&payload(&[]),
			)
			.await
			.unwrap();

		let intent = fixture.intent().await.unwrap();
		assert_eq!(intent.status, IntentStatus::Funded);
		assert_eq!(intent.creator, Some(creator()));
	}

	#[tokio::test]
	async fn test_started_moves_to_initiated_once() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Address);
		let handler = fixture.intent_handler();

		assert_eq!(
			handler
				.on_started(&context(1, 0, 1_000), intent_address())
				.await
				.unwrap(),
			Outcome::Skipped(SkipReason::UnknownIntent)
		);

		handler
			.on_declared(
				&context(2, 0, 2_000),
				intent_address(),
				declarer(),
				&payload(&[(usdc(), 1)]),
			)
			.await
			.unwrap();
		assert_eq!(
			handler
				.on_started(&context(3, 0, 3_000), intent_address())
				.await
				.unwrap(),
			Outcome::Applied
		);
		assert_eq!(
			fixture.intent().await.unwrap().status,
			IntentStatus::Initiated
		);
		assert_eq!(
			handler
				.on_started(&context(4, 0, 4_000), intent_address())
				.await
				.unwrap(),
			Outcome::Skipped(SkipReason::NoTransition)
		);
	}

	#[tokio::test]
	async fn test_chain_scope_keeps_same_address_apart() {
		let fixture = Fixture::new(IntentFlow::Combined, KeyScope::Chain);
		let handler = fixture.intent_handler();

		let on_base = context(1, 0, 1_000);
		let mut on_arbitrum = context(2, 0, 1_000);
		on_arbitrum.network = "arbitrum-one".to_string();

		for ctx in [&on_base, &on_arbitrum] {
			let outcome = handler
				.on_declared(ctx, intent_address(), declarer(), &payload(&[(usdc(), 1)]))
				.await
				.unwrap();
			assert_eq!(outcome, Outcome::Applied);
		}

		let keys = EntityKeys::new(KeyScope::Chain);
		for chain_id in [ChainId::BASE, ChainId::ARBITRUM] {
			let id = keys.intent(chain_id, &intent_address());
			let intent: Intent = fixture.storage.load(&id).await.unwrap().unwrap();
			assert_eq!(intent.chain_id, chain_id);
			assert_eq!(intent.bridge_token_out_options, vec![format!("{}-0", id)]);
		}
	}
}
