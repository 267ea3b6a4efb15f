use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::HandlerError;

/// A 64-byte BIP-39 seed. Wiped on drop.
pub struct MasterSeed([u8; 64]);

impl MasterSeed {
    /// Seed from a mnemonic phrase and optional passphrase.
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self, HandlerError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| HandlerError::InvalidMnemonic(e.to_string()))?;
        Ok(Self(mnemonic.to_seed(passphrase)))
    }

    /// Seed from 128 hex characters.
    pub fn from_hex(seed_hex: &str) -> Result<Self, HandlerError> {
        let mut bytes = hex::decode(seed_hex.trim())
            .map_err(|e| HandlerError::DerivationFailed(format!("seed is not hex: {e}")))?;
        if bytes.len() != 64 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(HandlerError::DerivationFailed(format!(
                "seed must be 64 bytes, got {len}"
            )));
        }
        let mut seed = [0u8; 64];
        seed.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(seed))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl Drop for MasterSeed {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Generate a new 24-word BIP-39 mnemonic (256 bits of entropy)
pub fn generate_mnemonic() -> Result<String, HandlerError> {
    let mut entropy = [0u8; 32];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| HandlerError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// A secp256k1 key pair derived at a BIP-32 path.
pub struct DerivedKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub public_key_uncompressed: [u8; 65],
    pub derivation_path: String,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Derive a secp256k1 key at `path` (e.g. `m/44'/60'/0'/0/0`).
pub fn derive_secp256k1_key(seed: &MasterSeed, path: &str) -> Result<DerivedKey, HandlerError> {
    let parsed: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| HandlerError::DerivationFailed(format!("{path}: {e}")))?;

    let xprv = XPrv::derive_from_path(seed.as_bytes(), &parsed)
        .map_err(|e| HandlerError::DerivationFailed(e.to_string()))?;

    let mut private_key: [u8; 32] = xprv.to_bytes();
    let signing_key = match SigningKey::from_bytes(&private_key.into()) {
        Ok(key) => key,
        Err(e) => {
            private_key.zeroize();
            return Err(HandlerError::DerivationFailed(e.to_string()));
        }
    };

    let verifying_key = signing_key.verifying_key();
    let public_key_compressed: [u8; 33] = verifying_key
        .to_encoded_point(true)
        .as_bytes()
        .try_into()
        .map_err(|_| HandlerError::DerivationFailed("Invalid public key length".into()))?;

    let public_key_uncompressed: [u8; 65] = verifying_key
        .to_encoded_point(false)
        .as_bytes()
        .try_into()
        .map_err(|_| HandlerError::DerivationFailed("Invalid uncompressed public key".into()))?;

    Ok(DerivedKey {
        private_key,
        public_key_compressed,
        public_key_uncompressed,
        derivation_path: path.to_string(),
    })
}

/// A fresh random secp256k1 private key.
pub fn random_secp256k1_key() -> Zeroizing<[u8; 32]> {
    let secret = k256::SecretKey::random(&mut OsRng);
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&secret.to_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> MasterSeed {
        MasterSeed::from_mnemonic(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_generate_mnemonic_24_words() {
        let mnemonic = generate_mnemonic().unwrap();
        assert_eq!(mnemonic.split_whitespace().count(), 24);
        assert!(validate_mnemonic(&mnemonic));
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
        assert!(MasterSeed::from_mnemonic("invalid mnemonic phrase here", "").is_err());
    }

    #[test]
    fn test_bip39_test_vector() {
        let seed = test_seed();
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let plain = test_seed();
        let with_pass = MasterSeed::from_mnemonic(TEST_MNEMONIC, "mypassphrase").unwrap();
        assert_ne!(plain.as_bytes(), with_pass.as_bytes());
    }

    #[test]
    fn test_seed_from_hex_round_trip() {
        let seed = test_seed();
        let again = MasterSeed::from_hex(&hex::encode(seed.as_bytes())).unwrap();
        assert_eq!(seed.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_seed_from_hex_rejects_wrong_length() {
        assert!(MasterSeed::from_hex("abcd").is_err());
        assert!(MasterSeed::from_hex("not hex").is_err());
    }

    #[test]
    fn test_derive_eth_key() {
        let key = derive_secp256k1_key(&test_seed(), "m/44'/60'/0'/0/0").unwrap();
        assert_eq!(key.derivation_path, "m/44'/60'/0'/0/0");
        assert_eq!(
            hex::encode(key.private_key),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
        assert!(key.public_key_compressed[0] == 0x02 || key.public_key_compressed[0] == 0x03);
        assert_eq!(key.public_key_uncompressed[0], 0x04);
        assert_eq!(key.public_key_compressed[1..], key.public_key_uncompressed[1..33]);
    }

    #[test]
    fn test_different_paths_different_keys() {
        let seed = test_seed();
        let btc = derive_secp256k1_key(&seed, "m/44'/0'/0'/0/0").unwrap();
        let ltc = derive_secp256k1_key(&seed, "m/44'/2'/0'/0/0").unwrap();
        assert_ne!(btc.private_key, ltc.private_key);
    }

    #[test]
    fn test_bad_path_rejected() {
        assert!(derive_secp256k1_key(&test_seed(), "44'/60'/0'").is_err());
        assert!(derive_secp256k1_key(&test_seed(), "m/x/0").is_err());
    }

    #[test]
    fn test_random_keys_differ() {
        let a = random_secp256k1_key();
        let b = random_secp256k1_key();
        assert_ne!(*a, *b);
        assert!(SigningKey::from_bytes(&(*a).into()).is_ok());
    }
}
