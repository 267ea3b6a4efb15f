//! Ethereum chain support for the coin handlers.
//!
//! This crate provides:
//! - Address derivation and validation with EIP-55 checksums
//! - EIP-1559 transaction building and signing
//! - ERC-20 `transfer` / `balanceOf` call encoding
//! - Mainnet and Sepolia network definitions
//! - A JSON-RPC client behind the [`rpc::EvmApi`] trait

pub mod abi;
pub mod address;
pub mod erc20;
pub mod error;
pub mod network;
pub mod rpc;
pub mod transaction;
