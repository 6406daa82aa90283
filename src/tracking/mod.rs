//! Product identity and tracking event model.
//!
//! Pure data shapes plus the local validation applied before anything is sent
//! to the contract. History rules that need ledger access (the first event of a
//! product being `REGISTER`) live in the contract client.

/// Product, event and history types
mod types;
/// Field validation and parsing of raw event records
mod validation;

pub use types::*;
pub use validation::*;
