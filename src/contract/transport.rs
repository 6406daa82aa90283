//! Ledger transport used by the contract client.
//!
//! The transport knows how to run a read-only call and how to submit a signed
//! envelope against a given endpoint. The Soroban RPC client implements it;
//! other implementations (an in-memory ledger in tests, for instance) plug in
//! behind the same trait.

use async_trait::async_trait;
use tracing::debug;

use super::{ContractCall, SubmissionReceipt};
use crate::rpc::{RpcError, SorobanRpcClient};
use crate::wallet::SignedEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
	/// The contract itself returned an error code.
	#[error("Contract error #{code}: {message}")]
	Contract { code: u32, message: String },

	#[error(transparent)]
	Rpc(#[from] RpcError),
}

/// Access to the contract's ledger.
#[async_trait]
pub trait ContractTransport: Send + Sync {
	/// Run a read-only call and return the contract's return value.
	async fn query(&self, rpc_url: &str, call: &ContractCall) -> Result<serde_json::Value, TransportError>;

	/// Submit a signed envelope once and wait for its outcome.
	async fn submit(
		&self,
		rpc_url: &str,
		envelope: &SignedEnvelope,
	) -> Result<SubmissionReceipt, TransportError>;

	/// Whether the endpoint reports itself healthy.
	async fn health(&self, rpc_url: &str) -> Result<bool, TransportError>;
}

/// Extract `N` from host error text such as `HostError: Error(Contract, #N)`.
pub fn contract_error_code(message: &str) -> Option<u32> {
	let start = message.find("Error(Contract, #")? + "Error(Contract, #".len();
	let digits: String = message[start..]
		.chars()
		.take_while(|c| c.is_ascii_digit())
		.collect();
	digits.parse().ok()
}

fn classify(error: RpcError) -> TransportError {
	let message = match &error {
		RpcError::SimulationFailed(message) => Some(message.clone()),
		RpcError::TransactionFailed { reason, .. } => Some(reason.clone()),
		RpcError::Rpc { message, .. } => Some(message.clone()),
		_ => None,
	};
	let Some(message) = message else {
		return TransportError::Rpc(error);
	};
	match contract_error_code(&message) {
		Some(code) => TransportError::Contract { code, message },
		None => TransportError::Rpc(error),
	}
}

#[async_trait]
impl ContractTransport for SorobanRpcClient {
	async fn query(&self, rpc_url: &str, call: &ContractCall) -> Result<serde_json::Value, TransportError> {
		let transaction = call.encode().map_err(RpcError::from)?;
		debug!("Simulating {}.{}", call.contract_id, call.function);
		self.simulate_transaction(rpc_url, &transaction)
			.await
			.map_err(classify)
	}

	async fn submit(
		&self,
		rpc_url: &str,
		envelope: &SignedEnvelope,
	) -> Result<SubmissionReceipt, TransportError> {
		let hash = self
			.send_transaction(rpc_url, &envelope.envelope)
			.await
			.map_err(classify)?;
		let response = self
			.wait_for_transaction(rpc_url, &hash)
			.await
			.map_err(classify)?;

		Ok(SubmissionReceipt {
			tx_hash: hash,
			ledger: response.ledger,
			return_value: response.return_value,
		})
	}

	async fn health(&self, rpc_url: &str) -> Result<bool, TransportError> {
		Ok(self.get_health(rpc_url).await?.is_healthy())
	}
}
