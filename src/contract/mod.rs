//! Contract client for the supply-chain tracking contract.
//!
//! - `config`: immutable endpoint and contract address of a client instance.
//! - `types`: contract calls, signed invocations, ledger records and errors.
//! - `transport`: the seam to the ledger, with its Soroban RPC implementation.
//! - `client`: registration, event submission and history queries.

pub mod client;
pub mod config;
pub mod transport;
pub mod types;

pub use client::ContractClient;
pub use config::ContractClientConfig;
pub use transport::{ContractTransport, TransportError};
pub use types::*;
