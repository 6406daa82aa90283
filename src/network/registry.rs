use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network used when nothing else is configured.
pub const DEFAULT_NETWORK: Network = Network::Testnet;

/// Supported Stellar networks.
///
/// The set is closed: any other name is rejected by [`Network::from_str`]
/// with a [`ConfigError`], so a `Network` value is always resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	Testnet,
	Mainnet,
	Futurenet,
}

impl Network {
	/// Every supported network, in display order.
	pub const ALL: [Network; 3] = [Network::Testnet, Network::Mainnet, Network::Futurenet];

	/// Resolve the horizon endpoint for this network.
	pub fn resolve_endpoint(&self) -> &'static str {
		match self {
			Network::Testnet => "https://horizon-testnet.stellar.org",
			Network::Mainnet => "https://horizon.stellar.org",
			Network::Futurenet => "https://horizon-futurenet.stellar.org",
		}
	}

	/// Soroban RPC endpoint used for contract calls.
	pub fn rpc_url(&self) -> &'static str {
		match self {
			Network::Testnet => "https://soroban-testnet.stellar.org",
			Network::Mainnet => "https://mainnet.sorobanrpc.com",
			Network::Futurenet => "https://rpc-futurenet.stellar.org",
		}
	}

	/// Passphrase that signed envelopes are bound to.
	pub fn passphrase(&self) -> &'static str {
		match self {
			Network::Testnet => "Test SDF Network ; September 2015",
			Network::Mainnet => "Public Global Stellar Network ; September 2015",
			Network::Futurenet => "Test SDF Future Network ; October 2022",
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Network::Testnet => "testnet",
			Network::Mainnet => "mainnet",
			Network::Futurenet => "futurenet",
		}
	}
}

impl Default for Network {
	fn default() -> Self {
		DEFAULT_NETWORK
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Network {
	type Err = ConfigError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"testnet" => Ok(Network::Testnet),
			"mainnet" | "public" => Ok(Network::Mainnet),
			"futurenet" => Ok(Network::Futurenet),
			_ => Err(ConfigError::UnknownNetwork(value.to_string())),
		}
	}
}

/// Configuration errors, raised where a value first enters the system.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("Unknown network: {0:?} (expected testnet, mainnet or futurenet)")]
	UnknownNetwork(String),

	#[error("Missing required setting: {0}")]
	Missing(&'static str),

	#[error("Invalid value for {key}: {reason}")]
	Invalid { key: &'static str, reason: String },
}
