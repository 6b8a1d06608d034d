//! Errors surfaced by the reconciliation engine.
//!
//! Domain anomalies (unknown targets, duplicates) are reported as
//! [`crate::Outcome::Skipped`], not as errors. What remains here are failures
//! of the collaborators the engine writes through.

use indexer_discovery::DiscoveryError;
use indexer_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Watch registry error: {0}")]
	Watch(#[from] DiscoveryError),
}
