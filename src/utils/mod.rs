//!
//! Utility module for the tracking client.
//!
//! Display helpers shared by the binary and log output.
/// Formatting helpers for keys and ledger timestamps
pub mod format;

pub use format::{format_timestamp, shorten_public_key};
