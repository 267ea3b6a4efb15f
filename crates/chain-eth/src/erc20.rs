use alloy_primitives::{Address, U256};

use crate::abi::{encode_function_call, AbiParam};

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `balanceOf(address)`: `0x70a08231`.
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Default gas limit for a token transfer when the token does not set one.
pub const DEFAULT_TRANSFER_GAS_LIMIT: u64 = 200_000;

/// Encodes an ERC-20 `transfer(address,uint256)` call (68 bytes).
pub fn encode_transfer(to: Address, amount: U256) -> Vec<u8> {
    let params = [AbiParam::Address(to), AbiParam::Uint256(amount)];
    encode_function_call(TRANSFER_SELECTOR, &params)
}

/// Encodes an ERC-20 `balanceOf(address)` call (36 bytes).
pub fn encode_balance_of(owner: Address) -> Vec<u8> {
    encode_function_call(BALANCE_OF_SELECTOR, &[AbiParam::Address(owner)])
}
