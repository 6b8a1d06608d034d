//! Command-line interface definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "intent-indexer")]
#[command(about = "Bridge intent event indexer", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "INDEXER_CONFIG", default_value = "config/indexer.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(long, env = "INDEXER_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Apply a JSON-lines event feed to the configured store
	Replay {
		/// Feed file, one event envelope or raw log per line
		#[arg(short, long)]
		feed: PathBuf,
	},

	/// Validate the configuration file
	Validate,

	/// Print a stored entity as JSON
	Show {
		#[arg(value_enum)]
		entity: EntityKind,
		id: String,
	},
}

/// Entity types that can be looked up with `show`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
	Intent,
	TokenAmount,
	Funding,
	Token,
	Broadcast,
	BroadcastDeposit,
	BroadcastTokenAmount,
}
