//! Replay of a JSON-lines event feed.
//!
//! Each line is either a decoded [`EventEnvelope`] or a raw log with its
//! context. Raw logs go through a [`LogRouter`] built from the configured
//! networks, so only logs from subscribed contracts and watched intent
//! accounts reach the engine.

use anyhow::{Context, Result};
use indexer_config::Config;
use indexer_core::{IndexerEngine, Outcome};
use indexer_discovery::{LogRouter, RawLog, StaticSources};
use indexer_types::{ChainId, EventContext, EventEnvelope};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedLine {
	Decoded(EventEnvelope),
	Raw { context: EventContext, log: RawLog },
}

/// Counters reported at the end of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
	pub applied: usize,
	pub skipped: usize,
	/// Lines before the network's start block or from unsubscribed sources.
	pub ignored: usize,
}

pub struct Replayer {
	engine: IndexerEngine,
	router: LogRouter,
	/// Configured network name to (chain id, start block).
	networks: HashMap<String, (ChainId, u64)>,
}

impl Replayer {
	pub fn new(engine: IndexerEngine, config: &Config) -> Self {
		let mut router = LogRouter::new(engine.watches().clone());
		let mut networks = HashMap::new();
		for (name, network) in &config.networks {
			router = router.with_sources(
				network.chain_id,
				StaticSources {
					intent_factory: Some(network.intent_factory),
					coordinator: network.coordinator,
					broadcaster: network.broadcaster,
					tokens: network.tokens.clone(),
				},
			);
			networks.insert(name.clone(), (network.chain_id, network.start_block));
		}

		Self {
			engine,
			router,
			networks,
		}
	}

	pub fn engine(&self) -> &IndexerEngine {
		&self.engine
	}

	pub async fn replay_file(&self, path: &Path) -> Result<ReplayStats> {
		let file = tokio::fs::File::open(path)
			.await
			.with_context(|| format!("Failed to open feed {:?}", path))?;
		self.replay(BufReader::new(file)).await
	}

	pub async fn replay<R: AsyncBufRead + Unpin>(&self, reader: R) -> Result<ReplayStats> {
		let mut stats = ReplayStats::default();
		let mut lines = reader.lines();
		let mut number = 0usize;

		while let Some(line) = lines.next_line().await? {
			number += 1;
			let line = line.trim();
			if line.is_empty() {
				continue;
			}

			let parsed: FeedLine = serde_json::from_str(line)
				.with_context(|| format!("Invalid feed entry on line {}", number))?;
			match self
				.apply(parsed)
				.await
				.with_context(|| format!("Failed to apply line {}", number))?
			{
				Some(Outcome::Applied) => stats.applied += 1,
				Some(Outcome::Skipped(reason)) => {
					debug!(line = number, ?reason, "event skipped");
					stats.skipped += 1;
				}
				None => stats.ignored += 1,
			}
		}

		info!(
			applied = stats.applied,
			skipped = stats.skipped,
			ignored = stats.ignored,
			"replay finished"
		);
		Ok(stats)
	}

	async fn apply(&self, line: FeedLine) -> Result<Option<Outcome>> {
		let envelope = match line {
			FeedLine::Decoded(mut envelope) => {
				if !self.prepare(&mut envelope.context) {
					return Ok(None);
				}
				envelope
			}
			FeedLine::Raw { mut context, log } => {
				if !self.prepare(&mut context) {
					return Ok(None);
				}
				let Some(event) = self.router.route(context.resolved_chain_id(), &log).await
				else {
					return Ok(None);
				};
				EventEnvelope { context, event }
			}
		};

		Ok(Some(self.engine.process(&envelope).await?))
	}

	/// Pins the chain id of configured networks and filters out blocks
	/// before their start block.
	fn prepare(&self, context: &mut EventContext) -> bool {
		let Some((chain_id, start_block)) = self.networks.get(&context.network) else {
			return true;
		};
		if context.chain_id.is_none() {
			context.chain_id = Some(*chain_id);
		}
		context.block_number >= *start_block
	}
}
