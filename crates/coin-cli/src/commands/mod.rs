//! CLI command implementations.
//!
//! - `wallet`: catalog listing, keys, addresses and explorer links
//! - `chain`: balance, fees and payments against the live backends

pub mod chain;
pub mod wallet;

pub use chain::*;
pub use wallet::*;
