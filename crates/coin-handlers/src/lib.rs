//! Per-coin wallet handlers behind one async trait.
//!
//! UTXO coins (BTC, BTC.TST, LTC, DOGE) sit over `chain-btc`; ether and
//! ERC-20 tokens sit over `chain-eth`. The [`registry::CoinRegistry`] wires
//! the built-in catalog and any configured tokens to their backends.

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fee_cache;
pub mod handler;
pub mod handlers;
pub mod keys;
pub mod notify;
pub mod registry;
pub mod units;

pub use config::WalletConfig;
pub use descriptor::{CoinDescriptor, ListingDescriptor, TokenSpec};
pub use error::HandlerError;
pub use handler::{Balance, CoinHandler, FeeOption};
pub use keys::MasterSeed;
pub use notify::{Notifier, TracingNotifier};
pub use registry::{Backends, CoinRegistry};
