//! Types for Soroban JSON-RPC integration

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
	pub jsonrpc: &'static str,
	pub id: u64,
	pub method: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub params: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
	pub result: Option<T>,
	pub error: Option<JsonRpcErrorObject>,
}

/// Error object of a failed JSON-RPC call.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
	pub code: i64,
	pub message: String,
	#[serde(default)]
	pub data: Option<serde_json::Value>,
}

/// Result of `getHealth`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
	pub status: String,
	#[serde(default)]
	pub latest_ledger: Option<u64>,
}

impl HealthResponse {
	pub fn is_healthy(&self) -> bool {
		self.status == "healthy"
	}
}

/// Result of `getNetwork`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
	pub passphrase: String,
	#[serde(default)]
	pub protocol_version: Option<u32>,
	#[serde(default)]
	pub friendbot_url: Option<String>,
}

/// Result of `getLatestLedger`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestLedgerResponse {
	pub id: String,
	pub sequence: u64,
	pub protocol_version: u32,
}

/// Status returned by `sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendTransactionStatus {
	/// Accepted into the queue
	Pending,
	/// Already submitted earlier
	Duplicate,
	/// Node is busy, nothing was queued
	TryAgainLater,
	/// Rejected
	Error,
}

impl SendTransactionStatus {
	/// Whether the node took the transaction.
	pub fn accepted(&self) -> bool {
		matches!(
			self,
			SendTransactionStatus::Pending | SendTransactionStatus::Duplicate
		)
	}
}

/// Result of `sendTransaction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
	pub status: SendTransactionStatus,
	pub hash: String,
	#[serde(default)]
	pub latest_ledger: Option<u64>,
	#[serde(default)]
	pub error_result_xdr: Option<String>,
}

/// Status returned by `getTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GetTransactionStatus {
	Success,
	Failed,
	NotFound,
}

/// Result of `getTransaction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
	pub status: GetTransactionStatus,
	#[serde(default)]
	pub ledger: Option<u64>,
	#[serde(default)]
	pub created_at: Option<String>,
	#[serde(default)]
	pub return_value: Option<serde_json::Value>,
	#[serde(default)]
	pub result_xdr: Option<String>,
}

/// Result of `simulateTransaction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionResponse {
	#[serde(default)]
	pub results: Vec<SimulateHostFunctionResult>,
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub latest_ledger: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateHostFunctionResult {
	pub retval: serde_json::Value,
}

/// Error types for RPC operations
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("No data returned")]
	NoData,

	#[error("Transaction rejected ({status:?}): {reason}")]
	TransactionRejected {
		status: SendTransactionStatus,
		reason: String,
	},

	#[error("Transaction {hash} failed: {reason}")]
	TransactionFailed { hash: String, reason: String },

	#[error("Simulation failed: {0}")]
	SimulationFailed(String),

	#[error("Transaction {0} not confirmed in time")]
	ConfirmationTimeout(String),
}
