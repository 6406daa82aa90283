//! Network selection for the chain connectivity layer.
//!
//! The registry maps each supported Stellar network to its endpoints and
//! passphrase. The selector holds the single process-wide active network that
//! the wallet manager and contract clients read.

/// Static network to endpoint mapping
mod registry;
/// Process-wide active network setting
mod selector;

pub use registry::*;
pub use selector::NetworkSelector;
