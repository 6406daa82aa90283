//!
//! Wallet provider integration.
//!
//! A provider is the out-of-process signer behind the wallet manager. Its only
//! contract is "connect and return a public key" and "sign a payload and return
//! a signed envelope". `RemoteSignerProvider` speaks that contract as JSON over
//! HTTP to a signer service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{SignedEnvelope, WalletAccount, WalletError};
use crate::network::Network;

/// Out-of-process signer used by the wallet manager.
#[async_trait]
pub trait WalletProvider: Send + Sync {
	/// Ask the signer for an account on `network`.
	async fn connect(&self, network: Network) -> Result<WalletAccount, WalletError>;

	/// Ask the signer to sign `payload` with `account` for `network`.
	async fn sign(
		&self,
		account: &WalletAccount,
		network: Network,
		payload: &[u8],
	) -> Result<SignedEnvelope, WalletError>;

	/// Release any provider-side session. Default is a no-op.
	async fn disconnect(&self) -> Result<(), WalletError> {
		Ok(())
	}

	/// Name used in logs.
	fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectResponse {
	public_key: Option<String>,
	error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest<'a> {
	public_key: &'a str,
	network_passphrase: &'a str,
	payload: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
	signed_envelope: Option<String>,
	error: Option<String>,
}

/// Signer service reached over HTTP.
#[derive(Clone)]
pub struct RemoteSignerProvider {
	http_client: Client,
	url: String,
}

impl RemoteSignerProvider {
	/// Create a client for the signer at `url`.
	pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
		let http_client = Client::builder().timeout(timeout).build()?;
		Ok(Self {
			http_client,
			url: url.into(),
		})
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.url.trim_end_matches('/'), path)
	}
}

#[async_trait]
impl WalletProvider for RemoteSignerProvider {
	async fn connect(&self, network: Network) -> Result<WalletAccount, WalletError> {
		let url = self.endpoint("connect");
		debug!("Requesting wallet connection from {}", url);

		let response = self
			.http_client
			.post(&url)
			.json(&json!({
				"network": network.as_str(),
				"networkPassphrase": network.passphrase(),
			}))
			.send()
			.await
			.map_err(|e| WalletError::ConnectionError(format!("signer unreachable: {}", e)))?;

		let status = response.status();
		let body: ConnectResponse = response.json().await?;

		if let Some(error) = body.error {
			return Err(WalletError::ConnectionError(error));
		}
		if !status.is_success() {
			return Err(WalletError::ConnectionError(format!(
				"signer returned HTTP {}",
				status
			)));
		}

		match body.public_key {
			Some(key) if !key.trim().is_empty() => {
				info!("Signer connected account {}", key);
				Ok(WalletAccount::new(key))
			}
			_ => Err(WalletError::ConnectionError(
				"signer returned no public key".to_string(),
			)),
		}
	}

	async fn sign(
		&self,
		account: &WalletAccount,
		network: Network,
		payload: &[u8],
	) -> Result<SignedEnvelope, WalletError> {
		let request = SignRequest {
			public_key: &account.public_key,
			network_passphrase: network.passphrase(),
			payload: hex::encode(payload),
		};

		let response = self
			.http_client
			.post(self.endpoint("sign"))
			.json(&request)
			.send()
			.await?;

		let status = response.status();
		let body: SignResponse = response.json().await?;

		if let Some(error) = body.error {
			return Err(WalletError::SigningError(error));
		}
		if !status.is_success() {
			return Err(WalletError::SigningError(format!(
				"signer returned HTTP {}",
				status
			)));
		}

		let envelope = body
			.signed_envelope
			.ok_or_else(|| WalletError::SigningError("signer returned no envelope".to_string()))?;

		Ok(SignedEnvelope {
			signer: account.public_key.clone(),
			envelope,
		})
	}

	async fn disconnect(&self) -> Result<(), WalletError> {
		let response = self
			.http_client
			.post(self.endpoint("disconnect"))
			.send()
			.await?;
		if !response.status().is_success() {
			warn!("Signer disconnect returned HTTP {}", response.status());
		}
		Ok(())
	}

	fn name(&self) -> &'static str {
		"RemoteSignerProvider"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn provider(server: &MockServer) -> RemoteSignerProvider {
		RemoteSignerProvider::new(server.uri(), Duration::from_secs(5)).unwrap()
	}

	#[tokio::test]
	async fn connect_returns_public_key() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/connect"))
			.and(body_partial_json(json!({ "network": "testnet" })))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "publicKey": "GABC" })))
			.expect(1)
			.mount(&server)
			.await;

		let account = provider(&server).connect(Network::Testnet).await.unwrap();
		assert_eq!(account.public_key, "GABC");
	}

	#[tokio::test]
	async fn connect_surfaces_signer_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/connect"))
			.respond_with(
				ResponseTemplate::new(403).set_body_json(json!({ "error": "user declined" })),
			)
			.mount(&server)
			.await;

		let err = provider(&server).connect(Network::Testnet).await.unwrap_err();
		assert!(matches!(err, WalletError::ConnectionError(msg) if msg == "user declined"));
	}

	#[tokio::test]
	async fn sign_sends_hex_payload_and_passphrase() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/sign"))
			.and(body_partial_json(json!({
				"publicKey": "GABC",
				"networkPassphrase": Network::Mainnet.passphrase(),
				"payload": "6869",
			})))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(json!({ "signedEnvelope": "AAAA" })),
			)
			.mount(&server)
			.await;

		let signed = provider(&server)
			.sign(&WalletAccount::new("GABC"), Network::Mainnet, b"hi")
			.await
			.unwrap();
		assert_eq!(signed.envelope, "AAAA");
		assert_eq!(signed.signer, "GABC");
	}

	#[tokio::test]
	async fn sign_without_envelope_is_rejected() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/sign"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
			.mount(&server)
			.await;

		let err = provider(&server)
			.sign(&WalletAccount::new("GABC"), Network::Testnet, b"x")
			.await
			.unwrap_err();
		assert!(matches!(err, WalletError::SigningError(_)));
	}
}
