//! Shared types for the intent indexer.
//!
//! Entities, inbound event variants, chain identity and key derivation used
//! by every other crate in the workspace.

pub mod chains;
pub mod entities;
pub mod events;
pub mod keys;
pub mod policy;

pub use chains::{native_currency, resolve_chain_id, ChainId, NativeCurrency};
pub use entities::*;
pub use events::*;
pub use keys::{hex_id, EntityKeys, KeyScope};
pub use policy::*;
