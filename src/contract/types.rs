use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::network::Network;
use crate::tracking::{Metadata, ProductId, TrackingEvent, TrackingEventType, ValidationError};

// Error codes raised by the tracking contract.
pub const CONTRACT_PRODUCT_ALREADY_EXISTS: u32 = 1;
pub const CONTRACT_PRODUCT_NOT_FOUND: u32 = 2;
pub const CONTRACT_UNAUTHORIZED: u32 = 3;
pub const CONTRACT_INVALID_INPUT: u32 = 4;
pub const CONTRACT_EVENT_NOT_FOUND: u32 = 5;
pub const CONTRACT_PRODUCT_DEACTIVATED: u32 = 21;

/// Human-readable name of a contract error code.
pub fn contract_error_name(code: u32) -> &'static str {
	match code {
		CONTRACT_PRODUCT_ALREADY_EXISTS => "product already exists",
		CONTRACT_PRODUCT_NOT_FOUND => "product not found",
		CONTRACT_UNAUTHORIZED => "unauthorized",
		CONTRACT_INVALID_INPUT => "invalid input",
		CONTRACT_EVENT_NOT_FOUND => "event not found",
		6..=9 => "invalid product field",
		10..=14 => "product field too long",
		15..=20 => "too many product attributes",
		CONTRACT_PRODUCT_DEACTIVATED => "product deactivated",
		_ => "unknown contract error",
	}
}

/// A contract function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
	pub contract_id: String,
	pub function: String,
	pub args: serde_json::Value,
}

impl ContractCall {
	pub fn new(
		contract_id: impl Into<String>,
		function: impl Into<String>,
		args: serde_json::Value,
	) -> Self {
		Self {
			contract_id: contract_id.into(),
			function: function.into(),
			args,
		}
	}

	/// Hex encoding used for read-only simulation.
	pub fn encode(&self) -> Result<String, serde_json::Error> {
		Ok(hex::encode(serde_json::to_vec(self)?))
	}
}

/// A call bound to a source account and network, as handed to the signer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
	pub call: ContractCall,
	pub source: String,
	pub network_passphrase: String,
	/// Random per-invocation value so identical calls produce distinct envelopes.
	pub nonce: String,
}

impl Invocation {
	pub fn new(call: ContractCall, source: impl Into<String>, network: Network) -> Self {
		let mut nonce = [0u8; 8];
		rand::rng().fill(&mut nonce);
		Self {
			call,
			source: source.into(),
			network_passphrase: network.passphrase().to_string(),
			nonce: hex::encode(nonce),
		}
	}

	/// Bytes the wallet signs.
	pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec(self)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(bytes)
	}
}

/// Outcome of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
	pub tx_hash: String,
	pub ledger: Option<u64>,
	pub return_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
	pub location: String,
}

/// Product record as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
	pub id: ProductId,
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub origin: Origin,
	pub owner: String,
	pub created_at: u64,
	pub active: bool,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub custom: BTreeMap<String, String>,
}

impl ProductRecord {
	/// The REGISTER event implied by this record.
	pub fn register_event(&self) -> TrackingEvent {
		let metadata: Metadata = self
			.custom
			.iter()
			.map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
			.collect();
		TrackingEvent::new(
			self.id.clone(),
			TrackingEventType::Register,
			self.created_at,
			metadata,
		)
	}
}

/// Error types for contract client operations
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
	#[error("Invalid input: {0}")]
	InvalidInput(#[from] ValidationError),

	#[error("Wallet is not connected")]
	NotConnected,

	#[error("Unknown product: {0}")]
	UnknownProduct(ProductId),

	#[error("Submission failed: {0}")]
	SubmissionError(String),

	#[error("Client is bound to {bound} but the active network is {active}")]
	NetworkChanged { bound: Network, active: Network },

	#[error("Malformed ledger response: {0}")]
	MalformedResponse(String),
}
