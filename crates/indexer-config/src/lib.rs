//! Configuration for the intent indexer.
//!
//! A deployment is described by one TOML file: reconciliation policies, the
//! entity store backend, and per-network contract addresses and start blocks.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Validation error: {0}")]
	Validation(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
