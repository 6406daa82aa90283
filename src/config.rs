//! Process configuration read from the environment.

use std::time::Duration;

use crate::contract::ContractClientConfig;
use crate::network::{ConfigError, Network};

pub const ENV_NETWORK: &str = "CHAIN_LOGISTICS_NETWORK";
pub const ENV_CONTRACT_ID: &str = "CHAIN_LOGISTICS_CONTRACT_ID";
pub const ENV_RPC_URL: &str = "CHAIN_LOGISTICS_RPC_URL";
pub const ENV_SIGNER_URL: &str = "CHAIN_LOGISTICS_SIGNER_URL";
pub const ENV_RPC_TIMEOUT_SECS: &str = "CHAIN_LOGISTICS_RPC_TIMEOUT_SECS";

const DEFAULT_SIGNER_URL: &str = "http://localhost:7300";
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
	pub network: Network,
	pub contract_id: String,
	/// Overrides the network's default RPC endpoint.
	pub rpc_url: Option<String>,
	pub signer_url: String,
	pub rpc_timeout: Duration,
}

impl AppConfig {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build from an arbitrary key lookup. Blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

		let network = match get(ENV_NETWORK) {
			Some(name) => name.parse()?,
			None => Network::default(),
		};

		let contract_id = get(ENV_CONTRACT_ID).ok_or(ConfigError::Missing(ENV_CONTRACT_ID))?;

		let rpc_timeout = match get(ENV_RPC_TIMEOUT_SECS) {
			Some(raw) => {
				let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
					key: ENV_RPC_TIMEOUT_SECS,
					reason: format!("{:?}: {}", raw, e),
				})?;
				if secs == 0 {
					return Err(ConfigError::Invalid {
						key: ENV_RPC_TIMEOUT_SECS,
						reason: "must be at least 1".to_string(),
					});
				}
				Duration::from_secs(secs)
			}
			None => Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
		};

		Ok(Self {
			network,
			contract_id,
			rpc_url: get(ENV_RPC_URL),
			signer_url: get(ENV_SIGNER_URL).unwrap_or_else(|| DEFAULT_SIGNER_URL.to_string()),
			rpc_timeout,
		})
	}

	/// Contract client settings for the configured network and endpoint.
	pub fn contract_config(&self) -> Result<ContractClientConfig, ConfigError> {
		match &self.rpc_url {
			Some(url) => ContractClientConfig::new(self.contract_id.clone(), url.clone(), self.network),
			None => ContractClientConfig::for_network(self.contract_id.clone(), self.network),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| map.get(key).cloned()
	}

	#[test]
	fn defaults_apply_when_only_contract_is_set() {
		let config = AppConfig::from_lookup(lookup(&[(ENV_CONTRACT_ID, "CCONTRACT")])).unwrap();
		assert_eq!(config.network, Network::Testnet);
		assert_eq!(config.signer_url, DEFAULT_SIGNER_URL);
		assert_eq!(config.rpc_timeout, Duration::from_secs(30));
		assert!(config.rpc_url.is_none());

		let contract = config.contract_config().unwrap();
		assert_eq!(contract.rpc_url(), Network::Testnet.rpc_url());
	}

	#[test]
	fn contract_id_is_required() {
		let err = AppConfig::from_lookup(lookup(&[(ENV_CONTRACT_ID, "  ")])).unwrap_err();
		assert_eq!(err, ConfigError::Missing(ENV_CONTRACT_ID));
	}

	#[test]
	fn unknown_network_is_rejected() {
		let err = AppConfig::from_lookup(lookup(&[
			(ENV_CONTRACT_ID, "CCONTRACT"),
			(ENV_NETWORK, "devnet"),
		]))
		.unwrap_err();
		assert_eq!(err, ConfigError::UnknownNetwork("devnet".to_string()));
	}

	#[test]
	fn overrides_are_honoured() {
		let config = AppConfig::from_lookup(lookup(&[
			(ENV_CONTRACT_ID, "CCONTRACT"),
			(ENV_NETWORK, "futurenet"),
			(ENV_RPC_URL, "http://127.0.0.1:8000/rpc"),
			(ENV_RPC_TIMEOUT_SECS, "5"),
		]))
		.unwrap();
		assert_eq!(config.network, Network::Futurenet);
		assert_eq!(config.rpc_timeout, Duration::from_secs(5));

		let contract = config.contract_config().unwrap();
		assert_eq!(contract.rpc_url(), "http://127.0.0.1:8000/rpc");
		assert_eq!(contract.network(), Network::Futurenet);
	}

	#[test]
	fn timeout_must_be_a_positive_integer() {
		for raw in ["abc", "0", "-3"] {
			let err = AppConfig::from_lookup(lookup(&[
				(ENV_CONTRACT_ID, "CCONTRACT"),
				(ENV_RPC_TIMEOUT_SECS, raw),
			]))
			.unwrap_err();
			assert!(matches!(err, ConfigError::Invalid { key: ENV_RPC_TIMEOUT_SECS, .. }));
		}
	}
}
