use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection status of the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
	Disconnected,
	Connecting,
	Connected,
	Error,
}

impl fmt::Display for WalletStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			WalletStatus::Disconnected => "disconnected",
			WalletStatus::Connecting => "connecting",
			WalletStatus::Connected => "connected",
			WalletStatus::Error => "error",
		};
		f.write_str(s)
	}
}

/// Account returned by a successful wallet handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
	pub public_key: String,
}

impl WalletAccount {
	pub fn new(public_key: impl Into<String>) -> Self {
		Self {
			public_key: public_key.into(),
		}
	}
}

/// Snapshot of the wallet connection.
///
/// An account is present exactly when the status is `Connected`; an error
/// message only when the status is `Error`. The constructors are the only way
/// to build a state, which keeps those pairs consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectionState {
	status: WalletStatus,
	account: Option<WalletAccount>,
	error: Option<String>,
	#[serde(skip)]
	attempt: u64,
}

impl WalletConnectionState {
	pub(crate) fn disconnected(attempt: u64) -> Self {
		Self {
			status: WalletStatus::Disconnected,
			account: None,
			error: None,
			attempt,
		}
	}

	pub(crate) fn connecting(attempt: u64) -> Self {
		Self {
			status: WalletStatus::Connecting,
			account: None,
			error: None,
			attempt,
		}
	}

	pub(crate) fn connected(attempt: u64, account: WalletAccount) -> Self {
		Self {
			status: WalletStatus::Connected,
			account: Some(account),
			error: None,
			attempt,
		}
	}

	pub(crate) fn failed(attempt: u64, message: impl Into<String>) -> Self {
		Self {
			status: WalletStatus::Error,
			account: None,
			error: Some(message.into()),
			attempt,
		}
	}

	pub fn status(&self) -> WalletStatus {
		self.status
	}

	pub fn account(&self) -> Option<&WalletAccount> {
		self.account.as_ref()
	}

	/// Human-readable reason of the last failed handshake.
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn is_connected(&self) -> bool {
		self.status == WalletStatus::Connected
	}

	pub(crate) fn attempt(&self) -> u64 {
		self.attempt
	}
}

impl Default for WalletConnectionState {
	fn default() -> Self {
		Self::disconnected(0)
	}
}

/// Signed transaction envelope produced by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEnvelope {
	/// Public key of the signer.
	pub signer: String,
	/// Opaque signed payload, ready for submission.
	pub envelope: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
	#[error("Wallet is not connected")]
	NotConnected,

	#[error("Wallet connection failed: {0}")]
	ConnectionError(String),

	#[error("Signing rejected: {0}")]
	SigningError(String),

	#[error("Signer HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Signer JSON error: {0}")]
	JsonError(#[from] serde_json::Error),
}
