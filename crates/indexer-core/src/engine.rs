//! Event routing and engine construction.

use indexer_config::{Config, IndexerSettings};
use indexer_discovery::{WatchInterface, WatchService};
use indexer_storage::{StorageInterface, StorageService};
use indexer_types::{EntityKeys, EventEnvelope, IndexerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::handlers::{BroadcastHandler, FundingAggregator, FundingTransfer, IntentHandler};
use crate::{IndexerError, Outcome};

/// Applies events to the entity store, one at a time.
///
/// Each [`IndexerEvent`] variant maps to exactly one handler operation. The
/// caller must await `process` before submitting the next event, since the
/// handlers rely on seeing the writes of the previous one.
pub struct IndexerEngine {
	storage: Arc<StorageService>,
	watches: Arc<WatchService>,
	intents: IntentHandler,
	funding: FundingAggregator,
	broadcasts: BroadcastHandler,
}

impl IndexerEngine {
	pub fn new(
		storage: Arc<StorageService>,
		watches: Arc<WatchService>,
		settings: &IndexerSettings,
	) -> Self {
		let keys = EntityKeys::new(settings.key_scope);
		Self {
			intents: IntentHandler::new(
				storage.clone(),
				watches.clone(),
				keys,
				settings.intent_flow,
			),
			funding: FundingAggregator::new(storage.clone(), keys),
			broadcasts: BroadcastHandler::new(storage.clone(), keys, settings.broadcast_terminal),
			storage,
			watches,
		}
	}

	pub async fn process(&self, envelope: &EventEnvelope) -> Result<Outcome, IndexerError> {
		let ctx = &envelope.context;
		let chain_id = ctx.resolved_chain_id();
		if !chain_id.is_known() {
			warn!(network = %ctx.network, "unresolvable network, entities will carry chain id 0");
		}

		let span = info_span!(
			"event",
			kind = envelope.event.kind(),
			%chain_id,
			block = ctx.block_number,
			tx = %ctx.transaction_hash,
			log_index = ctx.log_index,
		);

		async {
			match &envelope.event {
				IndexerEvent::IntentDeclared {
					intent_address,
					declarer,
					intent,
				} => {
					self.intents
						.on_declared(ctx, *intent_address, *declarer, intent)
						.await
				}
				IndexerEvent::IntentCreated {
					intent_address,
					creator,
					intent,
				} => {
					self.intents
						.on_created(ctx, *intent_address, *creator, intent)
						.await
				}
				IndexerEvent::IntentStarted { intent_address } => {
					self.intents.on_started(ctx, *intent_address).await
				}
				IndexerEvent::Erc20Transfer {
					token,
					from,
					to,
					value,
				} => {
					let transfer = FundingTransfer {
						token: Some(*token),
						sender: *from,
						recipient: *to,
						amount: *value,
					};
					self.funding.on_transfer(ctx, &transfer).await
				}
				// The intent account reports value it received, so it is the recipient.
				IndexerEvent::NativeTransfer {
					intent_address,
					from,
					amount,
					..
				} => {
					let transfer = FundingTransfer {
						token: None,
						sender: *from,
						recipient: *intent_address,
						amount: *amount,
					};
					self.funding.on_transfer(ctx, &transfer).await
				}
				IndexerEvent::IntentBroadcasted(payload) => {
					self.broadcasts.on_broadcasted(ctx, payload).await
				}
				IndexerEvent::BroadcastExecuted { broadcast_id } => {
					self.broadcasts.on_executed(broadcast_id).await
				}
				IndexerEvent::BroadcastCancelled { broadcast_id } => {
					self.broadcasts.on_cancelled(broadcast_id).await
				}
			}
		}
		.instrument(span)
		.await
	}

	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	pub fn watches(&self) -> &Arc<WatchService> {
		&self.watches
	}
}

type StorageFactory = Box<dyn Fn(&toml::Value) -> Box<dyn StorageInterface> + Send>;
type WatchFactory = Box<dyn Fn(&toml::Value) -> Box<dyn WatchInterface> + Send>;

/// Builds an [`IndexerEngine`] from configuration and registered backends.
///
/// Storage and watch registry factories are both keyed by storage backend
/// name and receive the same `[storage.config]` table, so dynamic watches are
/// kept wherever the entities are.
pub struct IndexerBuilder {
	config: Config,
	storage_factories: HashMap<String, StorageFactory>,
	watch_factories: HashMap<String, WatchFactory>,
}

impl IndexerBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			storage_factories: HashMap::new(),
			watch_factories: HashMap::new(),
		}
	}

	pub fn with_storage_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Box<dyn StorageInterface> + Send + 'static,
	{
		self.storage_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_watch_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Box<dyn WatchInterface> + Send + 'static,
	{
		self.watch_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn build(self) -> Result<IndexerEngine, IndexerError> {
		let backend = &self.config.storage.backend;
		let storage_factory = self.storage_factories.get(backend).ok_or_else(|| {
			IndexerError::Config(format!("No storage factory registered for '{}'", backend))
		})?;
		let storage_backend = storage_factory(&self.config.storage.config);

		let watch_factory = self.watch_factories.get(backend).ok_or_else(|| {
			IndexerError::Config(format!("No watch registry factory registered for '{}'", backend))
		})?;
		let watch_backend = watch_factory(&self.config.storage.config);

		info!(
			name = %self.config.indexer.name,
			storage = %backend,
			networks = self.config.networks.len(),
			"indexer engine built"
		);

		Ok(IndexerEngine::new(
			Arc::new(StorageService::new(storage_backend)),
			Arc::new(WatchService::new(watch_backend)),
			&self.config.indexer,
		))
	}
}
