//! Relay broadcast lifecycle: `PENDING -> EXECUTED | CANCELLED`.

use alloy_primitives::B256;
use indexer_storage::StorageService;
use indexer_types::{
	hex_id, Broadcast, BroadcastDeposit, BroadcastPayload, BroadcastStatus, BroadcastTokenAmount,
	EntityKeys, EventContext, TerminalPolicy,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{IndexerError, Outcome, SkipReason};

pub struct BroadcastHandler {
	storage: Arc<StorageService>,
	keys: EntityKeys,
	terminal: TerminalPolicy,
}

impl BroadcastHandler {
	pub fn new(storage: Arc<StorageService>, keys: EntityKeys, terminal: TerminalPolicy) -> Self {
		Self {
			storage,
			keys,
			terminal,
		}
	}

	pub async fn on_broadcasted(
		&self,
		ctx: &EventContext,
		payload: &BroadcastPayload,
	) -> Result<Outcome, IndexerError> {
		let id = self.keys.broadcast(&payload.broadcast_id);
		if self.storage.exists::<Broadcast>(&id).await? {
			warn!(broadcast = %id, "broadcast declared twice, keeping the first declaration");
			return Ok(Outcome::Skipped(SkipReason::DuplicateBroadcast));
		}

		let mut deposits = Vec::with_capacity(payload.deposits.len());
		for (index, deposit) in payload.deposits.iter().enumerate() {
			let deposit_id = self.keys.broadcast_deposit(&id, index);
			self.storage
				.upsert(&BroadcastDeposit {
					id: deposit_id.clone(),
					broadcast: id.clone(),
					token: deposit.token,
					amount: deposit.amount,
				})
				.await?;
			deposits.push(deposit_id);
		}

		let mut options = Vec::with_capacity(payload.bridge_token_out_options.len());
		for (index, option) in payload.bridge_token_out_options.iter().enumerate() {
			let option_id = self.keys.broadcast_token_amount(&id, index);
			self.storage
				.upsert(&BroadcastTokenAmount {
					id: option_id.clone(),
					broadcast: id.clone(),
					token: option.token,
					amount: option.amount,
				})
				.await?;
			options.push(option_id);
		}

		let broadcast = Broadcast {
			id: id.clone(),
			sender: payload.sender,
			source_chain: payload.source_chain,
			destination_chain: payload.destination_chain,
			destination_recipient: payload.recipient,
			refund_address: payload.refund_address,
			broadcaster: payload.broadcaster,
			broadcasting_contract: payload.broadcasting_contract,
			is_live: payload.is_live,
			status: BroadcastStatus::Pending,
			chain_id: ctx.resolved_chain_id(),
			block_number: ctx.block_number,
			block_timestamp: ctx.block_timestamp,
			transaction_hash: hex_id(ctx.transaction_hash),
			deposits,
			bridge_token_out_options: options,
		};
		self.storage.upsert(&broadcast).await?;

		info!(
			broadcast = %id,
			deposits = broadcast.deposits.len(),
			options = broadcast.bridge_token_out_options.len(),
			"broadcast indexed"
		);
		Ok(Outcome::Applied)
	}

	pub async fn on_executed(&self, broadcast_id: &B256) -> Result<Outcome, IndexerError> {
		self.finish(broadcast_id, BroadcastStatus::Executed).await
	}

	pub async fn on_cancelled(&self, broadcast_id: &B256) -> Result<Outcome, IndexerError> {
		self.finish(broadcast_id, BroadcastStatus::Cancelled).await
	}

	async fn finish(
		&self,
		broadcast_id: &B256,
		status: BroadcastStatus,
	) -> Result<Outcome, IndexerError> {
		let id = self.keys.broadcast(broadcast_id);
		let Some(mut broadcast) = self.storage.load::<Broadcast>(&id).await? else {
			warn!(broadcast = %id, ?status, "status change for unknown broadcast dropped");
			return Ok(Outcome::Skipped(SkipReason::UnknownBroadcast));
		};

		if broadcast.status == status {
			return Ok(Outcome::Skipped(SkipReason::NoTransition));
		}

		if broadcast.status.is_terminal() && self.terminal == TerminalPolicy::FirstWins {
			warn!(
				broadcast = %id,
				current = ?broadcast.status,
				requested = ?status,
				"broadcast already final, ignoring"
			);
			return Ok(Outcome::Skipped(SkipReason::TerminalBroadcast));
		}

		broadcast.status = status;
		self.storage.upsert(&broadcast).await?;
		info!(broadcast = %id, ?status, "broadcast status updated");
		Ok(Outcome::Applied)
	}
}
