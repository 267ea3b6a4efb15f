use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::bech32::{self, Hrp};
use bitcoin::hashes::Hash;
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{CompressedPublicKey, PubkeyHash, PublicKey, ScriptHash, WitnessProgram, WitnessVersion};
use zeroize::Zeroize;

use crate::error::BtcError;
use crate::network::UtxoNetwork;

/// A private key decoded from Wallet Import Format.
pub struct WifKey {
    pub secret: [u8; 32],
    /// Whether the key maps to a compressed public key (trailing 0x01 flag).
    pub compressed: bool,
}

impl WifKey {
    /// The secp256k1 public key for this secret, in the encoding the WIF asked for.
    pub fn public_key(&self) -> Result<PublicKey, BtcError> {
        let secp = Secp256k1::signing_only();
        let secret_key = SecretKey::from_slice(&self.secret)
            .map_err(|e| BtcError::InvalidPrivateKey(format!("invalid secret key: {e}")))?;
        let inner = bitcoin::secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        Ok(PublicKey {
            compressed: self.compressed,
            inner,
        })
    }
}

impl Drop for WifKey {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Encode a 32-byte secret as a compressed-key WIF string for the network.
pub fn encode_wif(secret: &[u8; 32], network: UtxoNetwork) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(network.params().wif_prefix);
    payload.extend_from_slice(secret);
    payload.push(0x01);

    let wif = bs58::encode(&payload).with_check().into_string();
    payload.zeroize();
    wif
}

/// Decode a WIF string, checking the version byte against the network.
pub fn decode_wif(wif: &str, network: UtxoNetwork) -> Result<WifKey, BtcError> {
    let mut payload = bs58::decode(wif.trim())
        .with_check(Some(network.params().wif_prefix))
        .into_vec()
        .map_err(|e| BtcError::InvalidPrivateKey(format!("invalid wif for {network}: {e}")))?;

    let compressed = match payload.len() {
        34 if payload[33] == 0x01 => true,
        33 => false,
        n => {
            payload.zeroize();
            return Err(BtcError::InvalidPrivateKey(format!(
                "unexpected wif payload length {n}"
            )));
        }
    };

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&payload[1..33]);
    payload.zeroize();

    Ok(WifKey { secret, compressed })
}

/// Base58check P2PKH address for a public key.
pub fn p2pkh_address(pubkey: &PublicKey, network: UtxoNetwork) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(network.params().p2pkh_prefix);
    payload.extend_from_slice(&pubkey.pubkey_hash().to_byte_array());
    bs58::encode(payload).with_check().into_string()
}

/// Derive a legacy P2PKH address from a 33-byte compressed public key.
pub fn pubkey_to_p2pkh_address(
    pubkey_bytes: &[u8; 33],
    network: UtxoNetwork,
) -> Result<String, BtcError> {
    let compressed_pk = CompressedPublicKey::from_slice(pubkey_bytes).map_err(|e| {
        BtcError::InvalidPublicKey(format!("failed to parse compressed public key: {e}"))
    })?;

    Ok(p2pkh_address(&PublicKey::from(compressed_pk), network))
}

/// Derive a P2WPKH (native SegWit bech32) address from a compressed public key.
///
/// Fails on networks without segwit.
pub fn pubkey_to_p2wpkh_address(
    pubkey_bytes: &[u8; 33],
    network: UtxoNetwork,
) -> Result<String, BtcError> {
    let compressed_pk = CompressedPublicKey::from_slice(pubkey_bytes).map_err(|e| {
        BtcError::InvalidPublicKey(format!("failed to parse compressed public key: {e}"))
    })?;

    let hrp = segwit_hrp(network)?;
    let program = compressed_pk.wpubkey_hash().to_byte_array();

    bech32::segwit::encode(hrp, bech32::segwit::VERSION_0, &program)
        .map_err(|e| BtcError::InvalidAddress(format!("bech32 encoding failed: {e}")))
}

/// Resolve an address string to the locking script it pays to.
///
/// Bitcoin networks go through `bitcoin::Address`, which knows every
/// standard address type. Other networks accept base58 P2PKH/P2SH with the
/// network's version bytes and, where the chain has segwit, bech32 programs.
pub fn address_to_script(address: &str, network: UtxoNetwork) -> Result<ScriptBuf, BtcError> {
    if let Some(net) = network.to_bitcoin_network() {
        let parsed = address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?
            .require_network(net)
            .map_err(|e| BtcError::InvalidAddress(format!("address wrong network: {e}")))?;
        return Ok(parsed.script_pubkey());
    }

    if let Some(hrp) = network.params().bech32_hrp {
        let prefix = format!("{hrp}1");
        if address.to_ascii_lowercase().starts_with(&prefix) {
            return segwit_script(address, network);
        }
    }

    base58_script(address, network)
}

/// Whether `address` is a payable address on `network`.
pub fn validate_address(address: &str, network: UtxoNetwork) -> bool {
    address_to_script(address, network).is_ok()
}

fn segwit_hrp(network: UtxoNetwork) -> Result<Hrp, BtcError> {
    let hrp = network
        .params()
        .bech32_hrp
        .ok_or_else(|| BtcError::InvalidAddress(format!("{network} has no segwit addresses")))?;
    Hrp::parse(hrp).map_err(|e| BtcError::InvalidAddress(format!("invalid hrp {hrp}: {e}")))
}

fn segwit_script(address: &str, network: UtxoNetwork) -> Result<ScriptBuf, BtcError> {
    let expected = segwit_hrp(network)?;
    let (hrp, version, program) = bech32::segwit::decode(address)
        .map_err(|e| BtcError::InvalidAddress(format!("invalid bech32 address: {e}")))?;

    if hrp != expected {
        return Err(BtcError::InvalidAddress(format!(
            "address hrp does not match {network}"
        )));
    }

    let version = WitnessVersion::try_from(version)
        .map_err(|e| BtcError::InvalidAddress(format!("invalid witness version: {e}")))?;
    let program = WitnessProgram::new(version, &program)
        .map_err(|e| BtcError::InvalidAddress(format!("invalid witness program: {e}")))?;

    Ok(ScriptBuf::new_witness_program(&program))
}

fn base58_script(address: &str, network: UtxoNetwork) -> Result<ScriptBuf, BtcError> {
    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| BtcError::InvalidAddress(format!("invalid base58check: {e}")))?;

    if payload.len() != 21 {
        return Err(BtcError::InvalidAddress(format!(
            "expected 21-byte payload, got {}",
            payload.len()
        )));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);

    let params = network.params();
    match payload[0] {
        v if v == params.p2pkh_prefix => {
            Ok(ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)))
        }
        v if v == params.p2sh_prefix => {
            Ok(ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)))
        }
        v => Err(BtcError::InvalidAddress(format!(
            "version byte 0x{v:02x} is not valid on {network}"
        ))),
    }
}
