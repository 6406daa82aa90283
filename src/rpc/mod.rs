//! Soroban RPC integration.
//!
//! This module provides the client and types for talking to a Soroban RPC
//! endpoint over HTTPS. The client holds no endpoint of its own: every call
//! names the RPC URL it targets, so a caller that captured an endpoint keeps
//! using it regardless of later network switches.

/// JSON-RPC client for Soroban RPC endpoints
mod client;
/// Request, response and error types
mod types;

pub use client::SorobanRpcClient;
pub use types::*;
