//! Bitcoin-family chain support for the coin handlers.
//!
//! Covers Bitcoin, Bitcoin testnet, Litecoin and Dogecoin: P2PKH and WIF
//! encoding per network, address decoding, UTXO coin selection, legacy and
//! segwit transaction signing, and a BlockCypher API client.

pub mod address;
pub mod api;
pub mod error;
pub mod network;
pub mod transaction;
pub mod utxo;
