//! Per-aggregate event handlers.

pub mod broadcast;
pub mod funding;
pub mod intent;

pub use broadcast::BroadcastHandler;
pub use funding::{FundingAggregator, FundingTransfer};
pub use intent::IntentHandler;
