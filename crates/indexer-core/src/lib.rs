//! Event-to-state reconciliation for the intent indexer.
//!
//! The engine turns a stream of decoded chain events into `Intent`,
//! `FundingTransaction`, `Token` and `Broadcast` entities. Every handler is
//! idempotent under redelivery and writes child entities before the parent
//! that references them.

pub mod engine;
pub mod error;
pub mod handlers;

#[cfg(test)]
pub(crate) mod test_utils;

pub use engine::{IndexerBuilder, IndexerEngine};
pub use error::IndexerError;
pub use handlers::{BroadcastHandler, FundingAggregator, FundingTransfer, IntentHandler};

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// The event changed stored state.
	Applied,
	/// The event was recognised and deliberately left without effect.
	Skipped(SkipReason),
}

impl Outcome {
	pub fn is_applied(&self) -> bool {
		matches!(self, Outcome::Applied)
	}
}

/// Why an event had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
	/// The intent was already created by an earlier declaration or creation.
	DuplicateIntent,
	/// The event targets an intent that was never declared.
	UnknownIntent,
	/// The transfer was already credited.
	DuplicateFunding,
	/// A broadcast with the same id already exists.
	DuplicateBroadcast,
	UnknownBroadcast,
	/// The broadcast already reached a terminal status.
	TerminalBroadcast,
	/// The target is already in the requested state.
	NoTransition,
}
