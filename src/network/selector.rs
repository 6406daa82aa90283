//! Process-wide active network.
//!
//! Exactly one network is active at a time. Changing it replaces the value in
//! a single step and notifies every subscriber; nothing already holding an
//! endpoint is redirected.

use super::Network;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::info;

/// Shared handle to the active network setting.
///
/// Clones observe and mutate the same setting.
#[derive(Debug, Clone)]
pub struct NetworkSelector {
	sender: Arc<watch::Sender<Network>>,
}

static GLOBAL: OnceLock<NetworkSelector> = OnceLock::new();

impl NetworkSelector {
	pub fn new(initial: Network) -> Self {
		let (sender, _) = watch::channel(initial);
		Self {
			sender: Arc::new(sender),
		}
	}

	/// The process-wide selector, created on first use with the default network.
	pub fn global() -> &'static NetworkSelector {
		GLOBAL.get_or_init(|| NetworkSelector::new(Network::default()))
	}

	/// Currently active network.
	pub fn active(&self) -> Network {
		*self.sender.borrow()
	}

	/// Switch the active network. Returns the previously active one.
	pub fn set(&self, network: Network) -> Network {
		let previous = self.sender.send_replace(network);
		if previous != network {
			info!("Active network changed: {} -> {}", previous, network);
		}
		previous
	}

	/// Receive every subsequent change of the active network.
	pub fn subscribe(&self) -> watch::Receiver<Network> {
		self.sender.subscribe()
	}
}

impl Default for NetworkSelector {
	fn default() -> Self {
		Self::new(Network::default())
	}
}
