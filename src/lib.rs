//! Chain connectivity for supply-chain product tracking on Stellar/Soroban.
//!
//! - [`network`]: known networks and the process-wide active network.
//! - [`tracking`]: product and tracking event model with local validation.
//! - [`wallet`]: wallet connection state machine and signer integration.
//! - [`rpc`]: Soroban JSON-RPC client.
//! - [`contract`]: contract client for registration, events and history.

pub mod config;
pub mod contract;
pub mod network;
pub mod rpc;
pub mod tracking;
pub mod utils;
pub mod wallet;
