use serde::{Deserialize, Serialize};

use crate::network::{ConfigError, Network};

/// Address and endpoint a contract client is built for.
///
/// Fields are fixed at construction; a different contract or endpoint needs a
/// new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractClientConfig {
	contract_id: String,
	rpc_url: String,
	network: Network,
}

impl ContractClientConfig {
	pub fn new(
		contract_id: impl Into<String>,
		rpc_url: impl Into<String>,
		network: Network,
	) -> Result<Self, ConfigError> {
		let contract_id = contract_id.into();
		let rpc_url = rpc_url.into();

		if contract_id.trim().is_empty() {
			return Err(ConfigError::Missing("contract id"));
		}
		if !(rpc_url.starts_with("https://") || rpc_url.starts_with("http://")) {
			return Err(ConfigError::Invalid {
				key: "rpc url",
				reason: format!("{rpc_url:?} is not an http(s) URL"),
			});
		}

		Ok(Self {
			contract_id,
			rpc_url,
			network,
		})
	}

	/// Config using the network's default RPC endpoint.
	pub fn for_network(contract_id: impl Into<String>, network: Network) -> Result<Self, ConfigError> {
		Self::new(contract_id, network.rpc_url(), network)
	}

	pub fn contract_id(&self) -> &str {
		&self.contract_id
	}

	pub fn rpc_url(&self) -> &str {
		&self.rpc_url
	}

	pub fn network(&self) -> Network {
		self.network
	}
}
