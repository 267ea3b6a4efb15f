use alloy_primitives::Address;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Parses a 0x-prefixed hex address (any case, checksum not checked).
pub fn parse_address(address: &str) -> Result<Address, EthError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_str.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    let bytes = hex::decode(hex_str)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    Ok(Address::from_slice(&bytes))
}

/// Derives an EIP-55 checksummed address from an uncompressed secp256k1
/// public key (65 bytes, starting with 0x04).
///
/// The address is the last 20 bytes of Keccak-256 over the 64-byte key body.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    Ok(Address::from_slice(&hash[12..]).to_checksum(None))
}

/// Derives the checksummed address controlled by a 32-byte private key.
pub fn private_key_to_address(private_key: &[u8; 32]) -> Result<String, EthError> {
    let secret = SecretKey::from_slice(private_key)
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    uncompressed_address(&secret.public_key())
}

fn uncompressed_address(pubkey: &PublicKey) -> Result<String, EthError> {
    let uncompressed = pubkey.to_encoded_point(false);
    let key_65: [u8; 65] = uncompressed
        .as_bytes()
        .try_into()
        .map_err(|_| EthError::InvalidPublicKey("unexpected uncompressed length".into()))?;
    pubkey_to_eth_address(&key_65)
}

/// Whether `address` is a well-formed address.
///
/// Requires `0x` + 40 hex characters. All-lowercase and all-uppercase forms
/// carry no checksum; mixed case must match EIP-55.
pub fn validate_address(address: &str) -> bool {
    let Ok(parsed) = parse_address(address) else {
        return false;
    };

    let hex_part = &address[2..];
    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if is_all_lower || is_all_upper {
        return true;
    }

    parsed.to_checksum(None)[2..] == *hex_part
}

/// Numeric seed for identicon rendering: hex characters 2..10 of the address.
pub fn identicon_seed(address: &str) -> Option<u32> {
    let chunk = address.get(2..10)?;
    u32::from_str_radix(chunk, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: [u8; 32] = {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    };

    #[test]
    fn eip55_checksum_known_addresses() {
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in cases {
            assert!(validate_address(expected), "{expected}");

            // Flipping the case of one letter breaks the checksum.
            let flip = expected[2..].find(|c: char| c.is_ascii_alphabetic()).unwrap() + 2;
            let mut broken = expected.to_string();
            let c = expected.as_bytes()[flip] as char;
            let swapped = if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            };
            broken.replace_range(flip..=flip, &swapped.to_string());
            assert!(!validate_address(&broken), "{broken}");
        }
    }

    #[test]
    fn validate_checksummed_and_single_case() {
        assert!(validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(validate_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(validate_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"));
    }

    #[test]
    fn validate_bad_checksum_is_false() {
        assert!(!validate_address("0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn validate_malformed_is_false() {
        assert!(!validate_address("0x5aAeb6053F"));
        assert!(!validate_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate_address(""));
    }

    #[test]
    fn private_key_one_address() {
        assert_eq!(
            private_key_to_address(&KEY_ONE).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn zero_private_key_is_rejected() {
        assert!(private_key_to_address(&[0u8; 32]).is_err());
    }

    #[test]
    fn invalid_uncompressed_prefix_errors() {
        let mut key = [0u8; 65];
        key[0] = 0x03;
        assert!(pubkey_to_eth_address(&key).is_err());
    }

    #[test]
    fn identicon_seed_reads_first_four_bytes() {
        assert_eq!(
            identicon_seed("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
            Some(0x7E5F4552)
        );
        assert_eq!(identicon_seed("0x12"), None);
        assert_eq!(identicon_seed("0xzzzzzzzz00"), None);
    }
}
