//!
//! JSON-RPC client for Soroban RPC endpoints.
//!
//! This module provides an async client for the subset of the Soroban RPC API
//! the contract layer needs: health and network probes, read-only simulation,
//! transaction submission, and confirmation polling. Every method takes the
//! endpoint URL explicitly.

use super::types::*;
use backoff::{ExponentialBackoff, future::retry};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

/// Soroban JSON-RPC client
#[derive(Debug)]
pub struct SorobanRpcClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Monotonic JSON-RPC request id.
	next_id: AtomicU64,
	/// First delay between confirmation polls.
	poll_interval: Duration,
	/// Give up waiting for confirmation after this long.
	confirmation_timeout: Duration,
}

impl SorobanRpcClient {
	/// Create a new RPC client.
	///
	/// # Arguments
	/// * `timeout` - Per-request HTTP timeout.
	///
	/// # Returns
	/// A new `SorobanRpcClient`, or an `RpcError` if the HTTP client cannot be built.
	pub fn new(timeout: Duration) -> Result<Self, RpcError> {
		let http_client = Client::builder().timeout(timeout).build()?;

		Ok(Self {
			http_client,
			next_id: AtomicU64::new(1),
			poll_interval: Duration::from_millis(500),
			confirmation_timeout: Duration::from_secs(30),
		})
	}

	/// Override confirmation polling settings.
	pub fn with_confirmation(mut self, poll_interval: Duration, timeout: Duration) -> Self {
		self.poll_interval = poll_interval;
		self.confirmation_timeout = timeout;
		self
	}

	/// Execute a JSON-RPC call.
	///
	/// # Arguments
	/// * `rpc_url` - Endpoint to call.
	/// * `method` - JSON-RPC method name.
	/// * `params` - Optional params object.
	///
	/// # Returns
	/// The decoded `result` member, or an `RpcError` for transport failures and
	/// JSON-RPC error objects.
	pub async fn call<T: DeserializeOwned>(
		&self,
		rpc_url: &str,
		method: &str,
		params: Option<serde_json::Value>,
	) -> Result<T, RpcError> {
		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			method,
			params,
		};
		debug!("RPC {} -> {} (id {})", method, rpc_url, request.id);

		let response = self
			.http_client
			.post(rpc_url)
			.header("Content-Type", "application/json")
			.json(&request)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RpcError::Rpc {
				code: i64::from(response.status().as_u16()),
				message: format!("HTTP error: {}", response.status()),
			});
		}

		let body: JsonRpcResponse<T> = response.json().await?;

		if let Some(error) = body.error {
			error!("RPC {} failed: {} ({})", method, error.message, error.code);
			return Err(RpcError::Rpc {
				code: error.code,
				message: error.message,
			});
		}

		body.result.ok_or(RpcError::NoData)
	}

	pub async fn get_health(&self, rpc_url: &str) -> Result<HealthResponse, RpcError> {
		self.call(rpc_url, "getHealth", None).await
	}

	pub async fn get_network(&self, rpc_url: &str) -> Result<NetworkResponse, RpcError> {
		self.call(rpc_url, "getNetwork", None).await
	}

	pub async fn get_latest_ledger(&self, rpc_url: &str) -> Result<LatestLedgerResponse, RpcError> {
		self.call(rpc_url, "getLatestLedger", None).await
	}

	/// Run a read-only invocation and return its value.
	pub async fn simulate_transaction(
		&self,
		rpc_url: &str,
		transaction: &str,
	) -> Result<serde_json::Value, RpcError> {
		let response: SimulateTransactionResponse = self
			.call(
				rpc_url,
				"simulateTransaction",
				Some(json!({ "transaction": transaction })),
			)
			.await?;

		if let Some(error) = response.error {
			return Err(RpcError::SimulationFailed(error));
		}

		response
			.results
			.into_iter()
			.next()
			.map(|r| r.retval)
			.ok_or(RpcError::NoData)
	}

	/// Submit a signed envelope once. Returns the transaction hash.
	pub async fn send_transaction(&self, rpc_url: &str, envelope: &str) -> Result<String, RpcError> {
		let response: SendTransactionResponse = self
			.call(
				rpc_url,
				"sendTransaction",
				Some(json!({ "transaction": envelope })),
			)
			.await?;

		if !response.status.accepted() {
			return Err(RpcError::TransactionRejected {
				status: response.status,
				reason: response
					.error_result_xdr
					.unwrap_or_else(|| "no reason given".to_string()),
			});
		}

		info!("Transaction {} accepted ({:?})", response.hash, response.status);
		Ok(response.hash)
	}

	pub async fn get_transaction(
		&self,
		rpc_url: &str,
		hash: &str,
	) -> Result<GetTransactionResponse, RpcError> {
		self.call(rpc_url, "getTransaction", Some(json!({ "hash": hash })))
			.await
	}

	/// Poll `getTransaction` until the transaction is no longer `NOT_FOUND`.
	///
	/// Only the status read is repeated; the transaction itself is never
	/// resubmitted. Transport errors end the wait immediately.
	pub async fn wait_for_transaction(
		&self,
		rpc_url: &str,
		hash: &str,
	) -> Result<GetTransactionResponse, RpcError> {
		let policy = ExponentialBackoff {
			initial_interval: self.poll_interval,
			current_interval: self.poll_interval,
			max_interval: Duration::from_secs(5),
			max_elapsed_time: Some(self.confirmation_timeout),
			..ExponentialBackoff::default()
		};

		let response = retry(policy, move || async move {
			let response = self
				.get_transaction(rpc_url, hash)
				.await
				.map_err(backoff::Error::permanent)?;
			match response.status {
				GetTransactionStatus::NotFound => {
					debug!("Transaction {} not yet in a ledger", hash);
					Err(backoff::Error::transient(RpcError::ConfirmationTimeout(
						hash.to_string(),
					)))
				}
				_ => Ok(response),
			}
		})
		.await?;

		if response.status == GetTransactionStatus::Failed {
			return Err(RpcError::TransactionFailed {
				hash: hash.to_string(),
				reason: response
					.result_xdr
					.clone()
					.unwrap_or_else(|| "no result".to_string()),
			});
		}

		info!(
			"Transaction {} confirmed in ledger {}",
			hash,
			response.ledger.unwrap_or_default()
		);
		Ok(response)
	}
}
