//! Chain identity resolution.
//!
//! Maps the logical network names used by deployments onto canonical numeric
//! chain ids. Resolution never fails: an unknown network resolves to
//! [`ChainId::UNKNOWN`] so that it can be called freely while processing events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
	/// Sentinel for networks that could not be resolved.
	pub const UNKNOWN: Self = Self(0);

	pub const ETHEREUM: Self = Self(1);
	pub const OPTIMISM: Self = Self(10);
	pub const BSC: Self = Self(56);
	pub const POLYGON: Self = Self(137);
	pub const MONAD: Self = Self(143);
	pub const HYPEREVM: Self = Self(999);
	pub const LISK: Self = Self(1135);
	pub const BASE: Self = Self(8453);
	pub const ARBITRUM: Self = Self(42161);
	pub const AVALANCHE_FUJI: Self = Self(43113);
	pub const AVALANCHE: Self = Self(43114);
	pub const BASE_SEPOLIA: Self = Self(84532);
	pub const ARBITRUM_SEPOLIA: Self = Self(421614);
	pub const SEPOLIA: Self = Self(11155111);

	/// Returns true unless this is the unresolved sentinel.
	pub fn is_known(&self) -> bool {
		*self != Self::UNKNOWN
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(ChainId(s.parse()?))
	}
}

/// Supported networks, keyed by the names deployments use for them.
const NETWORKS: &[(&str, ChainId)] = &[
	("mainnet", ChainId::ETHEREUM),
	("sepolia", ChainId::SEPOLIA),
	("base", ChainId::BASE),
	("base-sepolia", ChainId::BASE_SEPOLIA),
	("arbitrum-one", ChainId::ARBITRUM),
	("arbitrum-sepolia", ChainId::ARBITRUM_SEPOLIA),
	("avalanche", ChainId::AVALANCHE),
	("avalanche-testnet", ChainId::AVALANCHE_FUJI),
	("bsc", ChainId::BSC),
	("optimism", ChainId::OPTIMISM),
	("matic", ChainId::POLYGON),
	("monad", ChainId::MONAD),
	("hyperevm", ChainId::HYPEREVM),
	("lisk", ChainId::LISK),
];

/// Resolves a network name to its chain id, or [`ChainId::UNKNOWN`].
pub fn resolve_chain_id(network: &str) -> ChainId {
	NETWORKS
		.iter()
		.find(|(name, _)| *name == network)
		.map(|(_, id)| *id)
		.unwrap_or(ChainId::UNKNOWN)
}

/// Reverse lookup used for log output and config validation.
pub fn network_name(chain_id: ChainId) -> Option<&'static str> {
	NETWORKS
		.iter()
		.find(|(_, id)| *id == chain_id)
		.map(|(name, _)| *name)
}

/// All supported network names with their chain ids.
pub fn supported_networks() -> impl Iterator<Item = (&'static str, ChainId)> {
	NETWORKS.iter().copied()
}

/// Metadata of a chain's base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
	pub symbol: &'static str,
	pub name: &'static str,
	pub decimals: u8,
}

const ETHER: NativeCurrency = NativeCurrency {
	symbol: "ETH",
	name: "Ether",
	decimals: 18,
};

/// Native currency for a chain. Chains without a dedicated entry use Ether.
pub fn native_currency(chain_id: ChainId) -> NativeCurrency {
	match chain_id {
		ChainId::BSC => NativeCurrency {
			symbol: "BNB",
			name: "BNB",
			decimals: 18,
		},
		ChainId::AVALANCHE | ChainId::AVALANCHE_FUJI => NativeCurrency {
			symbol: "AVAX",
			name: "Avalanche",
			decimals: 18,
		},
		ChainId::POLYGON => NativeCurrency {
			symbol: "POL",
			name: "Polygon Ecosystem Token",
			decimals: 18,
		},
		ChainId::MONAD => NativeCurrency {
			symbol: "MON",
			name: "Monad",
			decimals: 18,
		},
		ChainId::HYPEREVM => NativeCurrency {
			symbol: "HYPE",
			name: "Hype",
			decimals: 18,
		},
		_ => ETHER,
	}
}
