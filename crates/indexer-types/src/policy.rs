//! Reconciliation policies chosen per deployment.

use serde::{Deserialize, Serialize};

/// How declaration and creation events relate to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentFlow {
	/// Declaration and creation are interchangeable: whichever arrives first
	/// creates the intent in `PENDING`, the other is ignored.
	#[default]
	Combined,
	/// Declaration creates the intent in `DECLARED`; a later creation event
	/// advances it to `PENDING` and records the creator.
	Staged,
}

/// What an execute/cancel event does to a broadcast that is already terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
	/// The first terminal state sticks; later terminal events are ignored.
	#[default]
	FirstWins,
	/// Every terminal event overwrites the status.
	Overwrite,
}
