//! Routing of raw logs to indexer events.
//!
//! A log is only turned into an event if it was emitted by a source the
//! indexer subscribes to: the configured factory, coordinator, broadcaster
//! and token contracts of its chain, or an intent account registered at
//! runtime.

use alloy_primitives::Address;
use indexer_types::{ChainId, IndexerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{decode_log, RawLog, WatchService, WatchTemplate};

/// Contracts watched on a chain from deployment time.
#[derive(Debug, Clone, Default)]
pub struct StaticSources {
	pub intent_factory: Option<Address>,
	/// Coordinator contract that may also emit `IntentStarted`.
	pub coordinator: Option<Address>,
	pub broadcaster: Option<Address>,
	pub tokens: Vec<Address>,
}

/// Decodes logs and filters them against the subscribed sources.
pub struct LogRouter {
	sources: HashMap<ChainId, StaticSources>,
	watches: Arc<WatchService>,
}

impl LogRouter {
	pub fn new(watches: Arc<WatchService>) -> Self {
		Self {
			sources: HashMap::new(),
			watches,
		}
	}

	pub fn with_sources(mut self, chain_id: ChainId, sources: StaticSources) -> Self {
		self.sources.insert(chain_id, sources);
		self
	}

	/// Whether `address` is a static source on `chain_id` or a watched
	/// intent account.
	pub async fn is_known_emitter(&self, chain_id: ChainId, address: Address) -> bool {
		if let Some(s) = self.sources.get(&chain_id) {
			if s.intent_factory == Some(address)
				|| s.coordinator == Some(address)
				|| s.broadcaster == Some(address)
				|| s.tokens.contains(&address)
			{
				return true;
			}
		}
		self.watches
			.is_watched(WatchTemplate::Intent, chain_id, address)
			.await
			.unwrap_or(false)
	}

	/// Returns the event carried by `log` if its emitter is subscribed on
	/// `chain_id`.
	pub async fn route(&self, chain_id: ChainId, log: &RawLog) -> Option<IndexerEvent> {
		let event = match decode_log(log) {
			Ok(Some(event)) => event,
			Ok(None) => return None,
			Err(e) => {
				// ERC-721 and other contracts reuse the ERC-20 `Transfer` topic.
				if self.is_known_emitter(chain_id, log.address).await {
					warn!(%chain_id, emitter = %log.address, error = %e, "dropping undecodable log");
				} else {
					debug!(%chain_id, emitter = %log.address, error = %e, "undecodable log from unsubscribed source");
				}
				return None;
			}
		};

		let sources = self.sources.get(&chain_id);
		let subscribed = match &event {
			IndexerEvent::IntentDeclared { .. } | IndexerEvent::IntentCreated { .. } => {
				sources.and_then(|s| s.intent_factory) == Some(log.address)
			}
			IndexerEvent::IntentStarted { .. } => sources.is_some_and(|s| {
				s.intent_factory == Some(log.address) || s.coordinator == Some(log.address)
			}),
			IndexerEvent::IntentBroadcasted(_)
			| IndexerEvent::BroadcastExecuted { .. }
			| IndexerEvent::BroadcastCancelled { .. } => {
				sources.and_then(|s| s.broadcaster) == Some(log.address)
			}
			IndexerEvent::Erc20Transfer { token, .. } => {
				sources.is_some_and(|s| s.tokens.contains(token))
			}
			IndexerEvent::NativeTransfer { intent_address, .. } => {
				match self
					.watches
					.is_watched(WatchTemplate::Intent, chain_id, *intent_address)
					.await
				{
					Ok(watched) => watched,
					Err(e) => {
						warn!(%chain_id, intent = %intent_address, error = %e, "watch lookup failed");
						false
					}
				}
			}
		};

		if subscribed {
			Some(event)
		} else {
			debug!(%chain_id, emitter = %log.address, kind = event.kind(), "log from unsubscribed source");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abi::{IIntent, IIntentBroadcaster, IIntentFactory, IERC20};
	use crate::decode::tests::raw;
	use crate::implementations::memory::MemoryWatchRegistry;
	use alloy_primitives::{address, Bytes, B256, U256};
	use alloy_sol_types::SolEvent;

	const FACTORY: Address = address!("fafafafafafafafafafafafafafafafafafafafa");
	const COORDINATOR: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
	const BROADCASTER: Address = address!("bcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbc");
	const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
	const INTENT: Address = address!("00000000000000000000000000000000000000aa");

	fn router() -> (LogRouter, Arc<WatchService>) {
		let watches = Arc::new(WatchService::new(Box::new(MemoryWatchRegistry::new())));
		let router = LogRouter::new(watches.clone()).with_sources(
			ChainId::BASE,
			StaticSources {
				intent_factory: Some(FACTORY),
				coordinator: Some(COORDINATOR),
				broadcaster: Some(BROADCASTER),
				tokens: vec![USDC],
			},
		);
		(router, watches)
	}

	#[tokio::test]
	async fn test_transfer_only_from_configured_tokens() {
		let (router, _) = router();
		let transfer = IERC20::Transfer {
			from: Address::repeat_byte(0x01),
			to: INTENT,
			value: U256::from(1u64),
		};

		assert!(router
			.route(ChainId::BASE, &raw(USDC, &transfer))
			.await
			.is_some());
		assert!(router
			.route(ChainId::BASE, &raw(Address::repeat_byte(0x0d), &transfer))
			.await
			.is_none());
		// same token, chain without configuration
		assert!(router
			.route(ChainId::ARBITRUM, &raw(USDC, &transfer))
			.await
			.is_none());
	}

	#[tokio::test]
	async fn test_native_transfer_requires_dynamic_watch() {
		let (router, watches) = router();
		let transfer = IIntent::NativeTransfer {
			from: Address::repeat_byte(0x01),
			to: INTENT,
			amount: U256::from(1u64),
		};
		let log = raw(INTENT, &transfer);

		assert!(router.route(ChainId::BASE, &log).await.is_none());

		watches
			.register(WatchTemplate::Intent, ChainId::BASE, INTENT)
			.await
			.unwrap();
		assert!(router.route(ChainId::BASE, &log).await.is_some());
	}

	#[tokio::test]
	async fn test_broadcast_events_only_from_broadcaster() {
		let (router, _) = router();
		let executed = IIntentBroadcaster::BroadcastExecuted {
			broadcastId: B256::repeat_byte(0x42),
		};

		assert!(router
			.route(ChainId::BASE, &raw(BROADCASTER, &executed))
			.await
			.is_some());
		assert!(router
			.route(ChainId::BASE, &raw(FACTORY, &executed))
			.await
			.is_none());
	}

	#[tokio::test]
	async fn test_started_accepted_from_factory_or_coordinator() {
		let (router, _) = router();
		let started = IIntentFactory::IntentStarted { intentAddr: INTENT };

		for emitter in [FACTORY, COORDINATOR] {
			match router.route(ChainId::BASE, &raw(emitter, &started)).await {
				Some(IndexerEvent::IntentStarted { intent_address }) => {
					assert_eq!(intent_address, INTENT)
				}
				other => panic!("unexpected route result: {:?}", other),
			}
		}
		assert!(router
			.route(ChainId::BASE, &raw(Address::repeat_byte(0x0e), &started))
			.await
			.is_none());
		// the coordinator only adds IntentStarted
		let transfer = IERC20::Transfer {
			from: Address::repeat_byte(0x01),
			to: INTENT,
			value: U256::from(1u64),
		};
		assert!(router
			.route(ChainId::BASE, &raw(COORDINATOR, &transfer))
			.await
			.is_none());
	}

	#[tokio::test]
	async fn test_nft_transfer_from_unknown_contract_is_dropped() {
		let (router, _) = router();
		let nft = Address::repeat_byte(0x72);
		// ERC-721 Transfer: same topic0, token id indexed, empty data
		let log = RawLog {
			address: nft,
			topics: vec![
				IERC20::Transfer::SIGNATURE_HASH,
				Address::repeat_byte(0x01).into_word(),
				INTENT.into_word(),
				B256::with_last_byte(7),
			],
			data: Bytes::new(),
		};

		assert!(router.route(ChainId::BASE, &log).await.is_none());
		assert!(!router.is_known_emitter(ChainId::BASE, nft).await);
		assert!(router.is_known_emitter(ChainId::BASE, USDC).await);
		assert!(router.is_known_emitter(ChainId::BASE, COORDINATOR).await);
	}
}
