//! Wallet connection state machine.
//!
//! `disconnected -> connecting -> connected | error`, driven only by
//! [`WalletConnectionManager::connect`] and [`WalletConnectionManager::disconnect`].
//! Every transition replaces the whole state in one step through a watch
//! channel, so readers and subscribers never see a half-applied change.
//!
//! At most one handshake is in flight: `connect` while `connecting` or
//! `connected` returns the current state without contacting the provider.
//! Each handshake carries an attempt number; `disconnect` moves to a new
//! attempt, so a handshake that finishes after a disconnect is dropped and its
//! signer session released.
//!
//! The handshake runs on its own task. A caller that stops waiting on
//! `connect` does not stop the attempt; its outcome still lands in the state.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{SignedEnvelope, WalletAccount, WalletConnectionState, WalletError, WalletProvider, WalletStatus};
use crate::network::{Network, NetworkSelector};

/// Single authoritative owner of the wallet connection.
pub struct WalletConnectionManager {
	provider: Arc<dyn WalletProvider>,
	selector: NetworkSelector,
	state: Arc<watch::Sender<WalletConnectionState>>,
}

impl WalletConnectionManager {
	pub fn new(provider: Arc<dyn WalletProvider>, selector: NetworkSelector) -> Self {
		let (state, _) = watch::channel(WalletConnectionState::default());
		Self {
			provider,
			selector,
			state: Arc::new(state),
		}
	}

	/// Current snapshot.
	pub fn state(&self) -> WalletConnectionState {
		self.state.borrow().clone()
	}

	pub fn status(&self) -> WalletStatus {
		self.state.borrow().status()
	}

	/// Connected account, if any.
	pub fn account(&self) -> Option<WalletAccount> {
		self.state.borrow().account().cloned()
	}

	/// Receive every subsequent state transition.
	pub fn subscribe(&self) -> watch::Receiver<WalletConnectionState> {
		self.state.subscribe()
	}

	/// Connect the wallet on the active network.
	///
	/// Only starts a handshake from `disconnected` or `error`. Failures are
	/// recorded in the `error` state and are not retried.
	pub async fn connect(&self) -> WalletConnectionState {
		let mut started = None;
		self.state.send_if_modified(|state| match state.status() {
			WalletStatus::Disconnected | WalletStatus::Error => {
				let attempt = state.attempt() + 1;
				*state = WalletConnectionState::connecting(attempt);
				started = Some(attempt);
				true
			}
			WalletStatus::Connecting | WalletStatus::Connected => false,
		});

		let Some(attempt) = started else {
			debug!("connect() ignored, wallet is {}", self.status());
			return self.state();
		};

		let network = self.selector.active();
		info!(
			"Connecting wallet via {} on {} (attempt {})",
			self.provider.name(),
			network,
			attempt
		);

		let task = tokio::spawn(handshake(
			self.provider.clone(),
			self.state.clone(),
			network,
			attempt,
		));
		if let Err(e) = task.await {
			error!("Wallet handshake task failed: {}", e);
			self.state.send_if_modified(|state| {
				if state.attempt() != attempt || state.status() != WalletStatus::Connecting {
					return false;
				}
				*state = WalletConnectionState::failed(attempt, "Wallet handshake aborted");
				true
			});
		}

		self.state()
	}

	/// Disconnect from any state. Always ends in `disconnected`.
	pub async fn disconnect(&self) -> WalletConnectionState {
		let mut previous = WalletStatus::Disconnected;
		self.state.send_modify(|state| {
			previous = state.status();
			*state = WalletConnectionState::disconnected(state.attempt() + 1);
		});

		if previous == WalletStatus::Connected {
			if let Err(e) = self.provider.disconnect().await {
				warn!("Wallet provider disconnect failed: {}", e);
			}
		}
		info!("Wallet disconnected (was {})", previous);

		self.state()
	}

	/// Sign `payload` with the connected account for `network`.
	///
	/// Signing never changes the connection state.
	pub async fn sign(
		&self,
		network: Network,
		payload: &[u8],
	) -> Result<SignedEnvelope, WalletError> {
		let account = self.account().ok_or(WalletError::NotConnected)?;
		debug!(
			"Requesting signature from {} for {} bytes on {}",
			account.public_key,
			payload.len(),
			network
		);
		self.provider.sign(&account, network, payload).await
	}
}

/// Run one provider handshake and apply its outcome if `attempt` is still current.
async fn handshake(
	provider: Arc<dyn WalletProvider>,
	state: Arc<watch::Sender<WalletConnectionState>>,
	network: Network,
	attempt: u64,
) {
	let next = match provider.connect(network).await {
		Ok(account) if account.public_key.trim().is_empty() => {
			error!("Wallet provider returned an empty public key");
			WalletConnectionState::failed(attempt, "Wallet returned an empty public key")
		}
		Ok(account) => {
			info!("Wallet connected: {}", account.public_key);
			WalletConnectionState::connected(attempt, account)
		}
		Err(e) => {
			error!("Wallet connection failed: {}", e);
			WalletConnectionState::failed(attempt, e.to_string())
		}
	};

	let opened_session = next.is_connected();
	let applied = state.send_if_modified(|state| {
		if state.attempt() != attempt || state.status() != WalletStatus::Connecting {
			return false;
		}
		*state = next;
		true
	});
	if applied {
		return;
	}

	warn!("Discarding result of superseded connection attempt {}", attempt);
	if opened_session {
		if let Err(e) = provider.disconnect().await {
			warn!("Releasing superseded wallet session failed: {}", e);
		}
	}
}
