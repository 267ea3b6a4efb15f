//! Minimal ABI encoding for EVM function calls.
//!
//! Just enough to build ERC-20 call data and read single-word return values
//! without pulling in a full ABI parser.

use alloy_primitives::{Address, U256};

use crate::error::EthError;

/// A single static ABI parameter.
#[derive(Debug, Clone)]
pub enum AbiParam {
    /// Left-padded to 32 bytes.
    Address(Address),
    Uint256(U256),
}

/// Encodes `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

fn encode_param(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<32>(),
    }
}

/// Decodes the first 32-byte word of return data as a uint256.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    let word = data.get(..32).ok_or_else(|| {
        EthError::EncodingError(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        ))
    })?;
    Ok(U256::from_be_slice(word))
}
