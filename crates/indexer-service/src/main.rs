use anyhow::{Context, Result};
use clap::Parser;
use indexer_config::{Config, ConfigLoader};
use indexer_core::{IndexerBuilder, IndexerEngine};
use indexer_discovery::implementations::{memory as memory_watches, storage::StorageWatchRegistry};
use indexer_storage::implementations::{file, memory};
use indexer_storage::StorageService;
use indexer_types::{
	Broadcast, BroadcastDeposit, BroadcastTokenAmount, Entity, FundingTransaction, Intent, Token,
	TokenAmount,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod replay;

use cli::{Cli, Command, EntityKind};
use replay::Replayer;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Command::Replay { feed } => replay_feed(&cli.config, feed).await,
		Command::Validate => validate_config(&cli.config),
		Command::Show { entity, id } => show_entity(&cli.config, entity, &id).await,
	}
}

fn load_config(path: &Path) -> Result<Config> {
	ConfigLoader::from_file(path).with_context(|| format!("Failed to load configuration {:?}", path))
}

/// Wires the backends named in `[storage]`. Dynamic watches are kept in the
/// same store as the entities, so a later run still routes native transfers
/// of intents declared earlier.
fn build_engine(config: Config) -> Result<IndexerEngine> {
	IndexerBuilder::new(config)
		.with_storage_factory("memory", memory::create_storage)
		.with_storage_factory("file", file::create_storage)
		.with_watch_factory("memory", memory_watches::create_registry)
		.with_watch_factory("file", |config| {
			Box::new(StorageWatchRegistry::new(file::create_storage(config)))
		})
		.build()
		.context("Failed to build indexer engine")
}

async fn replay_feed(config_path: &Path, feed: PathBuf) -> Result<()> {
	let config = load_config(config_path)?;
	info!("Replaying {:?} into '{}' storage", feed, config.storage.backend);

	let engine = build_engine(config.clone())?;
	let replayer = Replayer::new(engine, &config);
	let stats = replayer.replay_file(&feed).await?;

	println!(
		"applied: {}, skipped: {}, ignored: {}",
		stats.applied, stats.skipped, stats.ignored
	);
	Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
	let config = load_config(config_path)?;

	info!("Configuration is valid");
	info!("Indexer name: {}", config.indexer.name);
	info!(
		"Policies: flow={:?} keys={:?} broadcast_terminal={:?}",
		config.indexer.intent_flow, config.indexer.key_scope, config.indexer.broadcast_terminal
	);
	for (name, network) in &config.networks {
		info!(
			"  {}: chain {} factory {} from block {} ({} tokens)",
			name,
			network.chain_id,
			network.intent_factory,
			network.start_block,
			network.tokens.len()
		);
	}
	Ok(())
}

async fn show_entity(config_path: &Path, entity: EntityKind, id: &str) -> Result<()> {
	let config = load_config(config_path)?;
	let engine = build_engine(config)?;
	let storage = engine.storage();

	let json = match entity {
		EntityKind::Intent => render::<Intent>(storage, id).await?,
		EntityKind::TokenAmount => render::<TokenAmount>(storage, id).await?,
		EntityKind::Funding => render::<FundingTransaction>(storage, id).await?,
		EntityKind::Token => render::<Token>(storage, id).await?,
		EntityKind::Broadcast => render::<Broadcast>(storage, id).await?,
		EntityKind::BroadcastDeposit => render::<BroadcastDeposit>(storage, id).await?,
		EntityKind::BroadcastTokenAmount => render::<BroadcastTokenAmount>(storage, id).await?,
	};

	match json {
		Some(json) => println!("{}", json),
		None => anyhow::bail!("No {:?} with id '{}'", entity, id),
	}
	Ok(())
}

async fn render<E: Entity>(storage: &StorageService, id: &str) -> Result<Option<String>> {
	let Some(entity) = storage.load::<E>(id).await? else {
		return Ok(None);
	};
	Ok(Some(serde_json::to_string_pretty(&entity)?))
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
