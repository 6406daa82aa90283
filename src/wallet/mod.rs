//! Wallet connection and signing.
//!
//! The wallet provider is an out-of-process signer; this module owns the
//! connection state machine in front of it and is the only place that mutates
//! the connected account.

/// Connection state machine
pub mod manager;
/// Signer integration seam and its HTTP implementation
pub mod provider;
pub mod types;

pub use manager::WalletConnectionManager;
pub use provider::{RemoteSignerProvider, WalletProvider};
pub use types::*;
