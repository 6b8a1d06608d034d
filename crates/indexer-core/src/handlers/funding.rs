//! Funding aggregation.
//!
//! Each ERC-20 or native transfer into a tracked intent becomes one
//! `FundingTransaction`, is added to the intent's `total_funded`, and may move
//! the intent to `FUNDED`. The bar is the amount of the intent's first payout
//! option; other options are not summed.

use alloy_primitives::{Address, U256};
use indexer_storage::StorageService;
use indexer_types::{
	hex_id, native_currency, ChainId, EntityKeys, EventContext, FundingTransaction, Intent,
	IntentStatus, Token, TokenAmount,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{IndexerError, Outcome, SkipReason};

/// A value transfer observed on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingTransfer {
	/// ERC-20 contract, or `None` for the chain's native asset.
	pub token: Option<Address>,
	pub sender: Address,
	pub recipient: Address,
	pub amount: U256,
}

pub struct FundingAggregator {
	storage: Arc<StorageService>,
	keys: EntityKeys,
}

impl FundingAggregator {
	pub fn new(storage: Arc<StorageService>, keys: EntityKeys) -> Self {
		Self { storage, keys }
	}

	pub async fn on_transfer(
		&self,
		ctx: &EventContext,
		transfer: &FundingTransfer,
	) -> Result<Outcome, IndexerError> {
		let chain_id = ctx.resolved_chain_id();
		let intent_id = self.keys.intent(chain_id, &transfer.recipient);

		// Token contracts report every transfer; only those into intents count.
		let Some(mut intent) = self.storage.load::<Intent>(&intent_id).await? else {
			debug!(recipient = %transfer.recipient, %chain_id, "transfer to untracked address ignored");
			return Ok(Outcome::Skipped(SkipReason::UnknownIntent));
		};

		let funding_id = self.keys.funding(&ctx.transaction_hash, ctx.log_index);
		if intent.funding_transactions.contains(&funding_id) {
			info!(intent = %intent_id, funding = %funding_id, "transfer already credited, skipping");
			return Ok(Outcome::Skipped(SkipReason::DuplicateFunding));
		}

		let token_address = transfer.token.unwrap_or(Address::ZERO);
		let token = self.resolve_token(chain_id, token_address).await?;

		self.storage
			.upsert(&FundingTransaction {
				id: funding_id.clone(),
				intent: intent_id.clone(),
				token: token.id,
				token_address,
				amount: transfer.amount,
				sender: transfer.sender,
				chain_id,
				transaction_hash: hex_id(ctx.transaction_hash),
				block_number: ctx.block_number,
				timestamp: ctx.block_timestamp,
			})
			.await?;

		intent.total_funded = intent.total_funded.saturating_add(transfer.amount);
		intent.funding_transactions.push(funding_id.clone());

		let required = self.required_amount(&intent).await?;
		if intent.total_funded >= required && intent.status.advance(IntentStatus::Funded) {
			intent.funded_at = Some(ctx.block_timestamp);
			info!(
				intent = %intent_id,
				total = %intent.total_funded,
				%required,
				"intent funded"
			);
		}

		self.storage.upsert(&intent).await?;
		debug!(
			intent = %intent_id,
			funding = %funding_id,
			amount = %transfer.amount,
			total = %intent.total_funded,
			"transfer credited"
		);
		Ok(Outcome::Applied)
	}

	/// Loads the token record, creating it on first sight.
	async fn resolve_token(&self, chain_id: ChainId, address: Address) -> Result<Token, IndexerError> {
		let id = self.keys.token(chain_id, &address);
		if let Some(token) = self.storage.load::<Token>(&id).await? {
			return Ok(token);
		}

		let token = if address == Address::ZERO {
			let currency = native_currency(chain_id);
			Token {
				id,
				address,
				chain_id,
				symbol: Some(currency.symbol.to_string()),
				name: Some(currency.name.to_string()),
				decimals: Some(currency.decimals),
			}
		} else {
			Token {
				id,
				address,
				chain_id,
				symbol: None,
				name: None,
				decimals: None,
			}
		};
		self.storage.upsert(&token).await?;
		debug!(token = %token.id, %chain_id, "token recorded");
		Ok(token)
	}

	/// Amount of the first payout option, zero when the intent has none.
	async fn required_amount(&self, intent: &Intent) -> Result<U256, IndexerError> {
		let Some(first) = intent.bridge_token_out_options.first() else {
			return Ok(U256::ZERO);
		};
		match self.storage.load::<TokenAmount>(first).await? {
			Some(option) => Ok(option.amount),
			None => {
				warn!(intent = %intent.id, option = %first, "first payout option missing, treating requirement as zero");
				Ok(U256::ZERO)
			}
		}
	}
}
