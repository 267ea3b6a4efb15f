use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, ScriptBuf};
use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Amount, CompressedPublicKey, Sequence, Transaction, TxIn, TxOut, Witness};

use crate::address::{address_to_script, WifKey};
use crate::error::BtcError;
use crate::network::UtxoNetwork;
use crate::utxo::Utxo;

/// Output script type the wallet spends from and sends change to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Legacy pay-to-pubkey-hash, signed with the pre-segwit sighash.
    P2pkh,
    /// Native segwit v0 pay-to-witness-pubkey-hash (BIP-143 sighash).
    P2wpkh,
}

impl ScriptKind {
    /// Estimated vbytes per input: 41 base + 107 script_sig for P2PKH,
    /// 41 base + ~27 witness vbytes for P2WPKH.
    pub(crate) fn input_vbytes(self) -> u64 {
        match self {
            ScriptKind::P2pkh => 148,
            ScriptKind::P2wpkh => 68,
        }
    }

    fn output_vbytes(self) -> u64 {
        match self {
            ScriptKind::P2pkh => 34,
            ScriptKind::P2wpkh => 31,
        }
    }

    /// version + locktime + counts, plus the segwit marker/flag.
    fn overhead_vbytes(self) -> u64 {
        match self {
            ScriptKind::P2pkh => 10,
            ScriptKind::P2wpkh => 11,
        }
    }
}

/// An unsigned transaction ready for signing.
#[derive(Debug, Clone)]
pub struct UnsignedBtcTx {
    /// The transaction with empty script_sigs and witnesses.
    pub tx: Transaction,
    /// The UTXOs being spent, in input order. Needed for sighashes.
    pub prevouts: Vec<TxOut>,
    pub kind: ScriptKind,
    /// Fee paid, including any dust change folded into it.
    pub fee_sat: u64,
}

/// Estimated virtual size for a transaction shape.
pub fn estimate_vsize(kind: ScriptKind, num_inputs: usize, num_outputs: usize) -> u64 {
    kind.overhead_vbytes()
        + (num_inputs as u64 * kind.input_vbytes())
        + (num_outputs as u64 * kind.output_vbytes())
}

/// `estimate_vsize * fee_rate_sat_vbyte`.
pub fn estimate_fee(
    kind: ScriptKind,
    num_inputs: usize,
    num_outputs: usize,
    fee_rate_sat_vbyte: u64,
) -> u64 {
    estimate_vsize(kind, num_inputs, num_outputs).saturating_mul(fee_rate_sat_vbyte)
}

/// Build an unsigned spend of `amount_sat` to `recipient`.
///
/// Selects UTXOs largest-first. A change output back to `change_address` is
/// added only if the change exceeds the network's dust threshold; otherwise
/// the remainder goes to the fee.
pub fn build_transaction(
    utxos: &[Utxo],
    recipient: &str,
    amount_sat: u64,
    change_address: &str,
    fee_rate_sat_vbyte: u64,
    network: UtxoNetwork,
    kind: ScriptKind,
) -> Result<UnsignedBtcTx, BtcError> {
    if amount_sat == 0 {
        return Err(BtcError::TransactionBuildError("amount must be positive".into()));
    }

    let recipient_script = address_to_script(recipient, network)
        .map_err(|e| BtcError::InvalidAddress(format!("recipient: {e}")))?;
    let change_script = address_to_script(change_address, network)
        .map_err(|e| BtcError::InvalidAddress(format!("change: {e}")))?;

    let dust_threshold = network.params().dust_threshold;
    if amount_sat <= dust_threshold {
        return Err(BtcError::TransactionBuildError(format!(
            "amount {amount_sat} is at or below the {network} dust threshold {dust_threshold}"
        )));
    }

    let selection = crate::utxo::select_utxos(utxos, amount_sat, fee_rate_sat_vbyte, kind)?;

    let mut inputs = Vec::with_capacity(selection.selected.len());
    let mut prevouts = Vec::with_capacity(selection.selected.len());

    for utxo in &selection.selected {
        inputs.push(TxIn {
            previous_output: utxo.outpoint()?,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::default(),
        });
        prevouts.push(utxo.prevout());
    }

    let n_inputs = selection.selected.len();
    let fee_2_outputs = estimate_fee(kind, n_inputs, 2, fee_rate_sat_vbyte);
    let fee_1_output = estimate_fee(kind, n_inputs, 1, fee_rate_sat_vbyte);

    let change_sat = selection
        .total_sat
        .saturating_sub(amount_sat.saturating_add(fee_2_outputs));

    let mut outputs = vec![TxOut {
        value: Amount::from_sat(amount_sat),
        script_pubkey: recipient_script,
    }];

    let fee_sat = if change_sat > dust_threshold {
        outputs.push(TxOut {
            value: Amount::from_sat(change_sat),
            script_pubkey: change_script,
        });
        fee_2_outputs
    } else {
        // No change output: the whole remainder is fee.
        let fee = selection.total_sat - amount_sat;
        debug_assert!(fee >= fee_1_output);
        fee
    };

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };

    Ok(UnsignedBtcTx {
        tx,
        prevouts,
        kind,
        fee_sat,
    })
}

/// Sign every input of `unsigned_tx` with one key and serialize the result.
///
/// All inputs are assumed to be controlled by `key`. P2PKH inputs get a
/// `<sig> <pubkey>` script_sig over the legacy sighash; P2WPKH inputs get a
/// `[sig, pubkey]` witness over the BIP-143 sighash.
pub fn sign_transaction(unsigned_tx: &UnsignedBtcTx, key: &WifKey) -> Result<Vec<u8>, BtcError> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(&key.secret)
        .map_err(|e| BtcError::InvalidPrivateKey(format!("invalid secret key: {e}")))?;
    let public_key = key.public_key()?;

    if unsigned_tx.prevouts.len() != unsigned_tx.tx.input.len() {
        return Err(BtcError::SigningError(format!(
            "{} prevouts for {} inputs",
            unsigned_tx.prevouts.len(),
            unsigned_tx.tx.input.len()
        )));
    }

    let mut signed_tx = unsigned_tx.tx.clone();
    let mut sighash_cache = SighashCache::new(&unsigned_tx.tx);

    for input_index in 0..signed_tx.input.len() {
        let prevout = &unsigned_tx.prevouts[input_index];

        let digest = match unsigned_tx.kind {
            ScriptKind::P2pkh => sighash_cache
                .legacy_signature_hash(
                    input_index,
                    &prevout.script_pubkey,
                    EcdsaSighashType::All.to_u32(),
                )
                .map_err(|e| BtcError::SigningError(format!("sighash computation failed: {e}")))?
                .to_byte_array(),
            ScriptKind::P2wpkh => {
                if !public_key.compressed {
                    return Err(BtcError::SigningError(
                        "segwit inputs require a compressed key".into(),
                    ));
                }
                let script_code =
                    ScriptBuf::new_p2wpkh(&CompressedPublicKey(public_key.inner).wpubkey_hash());
                sighash_cache
                    .p2wpkh_signature_hash(
                        input_index,
                        &script_code,
                        prevout.value,
                        EcdsaSighashType::All,
                    )
                    .map_err(|e| {
                        BtcError::SigningError(format!("sighash computation failed: {e}"))
                    })?
                    .to_byte_array()
            }
        };

        let msg = Message::from_digest(digest);
        let signature = bitcoin::ecdsa::Signature {
            signature: secp.sign_ecdsa(&msg, &secret_key),
            sighash_type: EcdsaSighashType::All,
        };

        match unsigned_tx.kind {
            ScriptKind::P2pkh => {
                signed_tx.input[input_index].script_sig = Builder::new()
                    .push_slice(signature.serialize())
                    .push_key(&public_key)
                    .into_script();
            }
            ScriptKind::P2wpkh => {
                let mut witness = Witness::new();
                witness.push(signature.to_vec());
                witness.push(public_key.inner.serialize());
                signed_tx.input[input_index].witness = witness;
            }
        }
    }

    Ok(bitcoin::consensus::serialize(&signed_tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{encode_wif, decode_wif, p2pkh_address, pubkey_to_p2wpkh_address};

    fn make_test_utxo(txid: &str, vout: u32, amount_sat: u64, script: &ScriptBuf) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout,
            amount_sat,
            script_pubkey: script.to_bytes(),
        }
    }

    fn test_key(network: UtxoNetwork) -> WifKey {
        decode_wif(&encode_wif(&[0x42; 32], network), network).unwrap()
    }

    fn legacy_address(network: UtxoNetwork) -> (String, ScriptBuf) {
        let key = test_key(network);
        let address = p2pkh_address(&key.public_key().unwrap(), network);
        let script = address_to_script(&address, network).unwrap();
        (address, script)
    }

    #[test]
    fn estimate_vsize_per_kind() {
        assert_eq!(estimate_vsize(ScriptKind::P2pkh, 1, 2), 226);
        assert_eq!(estimate_vsize(ScriptKind::P2wpkh, 1, 2), 141);
    }

    #[test]
    fn estimate_fee_scales_with_inputs() {
        let fee_1 = estimate_fee(ScriptKind::P2wpkh, 1, 2, 10);
        let fee_2 = estimate_fee(ScriptKind::P2wpkh, 2, 2, 10);
        assert_eq!(fee_2 - fee_1, 68 * 10);
    }

    #[test]
    fn estimate_fee_zero_rate() {
        assert_eq!(estimate_fee(ScriptKind::P2pkh, 5, 5, 0), 0);
    }

    #[test]
    fn build_legacy_with_change() {
        let (address, script) = legacy_address(UtxoNetwork::Bitcoin);
        let utxos = vec![make_test_utxo(&"a".repeat(64), 0, 100_000, &script)];

        let unsigned = build_transaction(
            &utxos,
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            50_000,
            &address,
            2,
            UtxoNetwork::Bitcoin,
            ScriptKind::P2pkh,
        )
        .unwrap();

        assert_eq!(unsigned.tx.input.len(), 1);
        assert_eq!(unsigned.tx.output.len(), 2);
        assert_eq!(unsigned.tx.output[0].value.to_sat(), 50_000);
        assert_eq!(unsigned.tx.output[1].script_pubkey, script);
        assert_eq!(unsigned.fee_sat, 226 * 2);
        assert_eq!(unsigned.tx.output[1].value.to_sat(), 100_000 - 50_000 - 452);
    }

    #[test]
    fn dust_change_goes_to_fee() {
        let (address, script) = legacy_address(UtxoNetwork::Bitcoin);
        let utxos = vec![make_test_utxo(&"b".repeat(64), 0, 100_000, &script)];

        // 100_000 - 99_500 - 226 = 274 sat change, below the 546 dust limit.
        let unsigned = build_transaction(
            &utxos,
            &address,
            99_500,
            &address,
            1,
            UtxoNetwork::Bitcoin,
            ScriptKind::P2pkh,
        )
        .unwrap();

        assert_eq!(unsigned.tx.output.len(), 1);
        assert_eq!(unsigned.fee_sat, 500);
    }

    #[test]
    fn dogecoin_dust_threshold_is_larger() {
        let (address, script) = legacy_address(UtxoNetwork::Dogecoin);
        let utxos = vec![make_test_utxo(&"c".repeat(64), 0, 10_000_000, &script)];

        // Change of ~500_000 koinu is dust on Dogecoin.
        let unsigned = build_transaction(
            &utxos,
            &address,
            9_400_000,
            &address,
            100,
            UtxoNetwork::Dogecoin,
            ScriptKind::P2pkh,
        )
        .unwrap();

        assert_eq!(unsigned.tx.output.len(), 1);
    }

    #[test]
    fn amount_at_dust_is_rejected() {
        let (address, script) = legacy_address(UtxoNetwork::Bitcoin);
        let utxos = vec![make_test_utxo(&"d".repeat(64), 0, 100_000, &script)];
        let result = build_transaction(
            &utxos,
            &address,
            546,
            &address,
            1,
            UtxoNetwork::Bitcoin,
            ScriptKind::P2pkh,
        );
        assert!(result.is_err());
    }

    #[test]
    fn insufficient_funds() {
        let (address, script) = legacy_address(UtxoNetwork::Litecoin);
        let utxos = vec![make_test_utxo(&"e".repeat(64), 0, 10_000, &script)];
        let result = build_transaction(
            &utxos,
            &address,
            500_000,
            &address,
            1,
            UtxoNetwork::Litecoin,
            ScriptKind::P2pkh,
        );
        assert!(result.is_err());
    }

    #[test]
    fn wrong_network_recipient_is_rejected() {
        let (address, script) = legacy_address(UtxoNetwork::Dogecoin);
        let utxos = vec![make_test_utxo(&"f".repeat(64), 0, 100_000_000, &script)];
        let (ltc_address, _) = legacy_address(UtxoNetwork::Litecoin);

        let result = build_transaction(
            &utxos,
            &ltc_address,
            50_000_000,
            &address,
            1,
            UtxoNetwork::Dogecoin,
            ScriptKind::P2pkh,
        );
        assert!(matches!(result, Err(BtcError::InvalidAddress(_))));
    }

    #[test]
    fn sign_legacy_fills_script_sig() {
        let network = UtxoNetwork::Dogecoin;
        let (address, script) = legacy_address(network);
        let utxos = vec![
            make_test_utxo(&"ab".repeat(32), 0, 60_000_000, &script),
            make_test_utxo(&"cd".repeat(32), 1, 60_000_000, &script),
        ];

        let unsigned = build_transaction(
            &utxos,
            &address,
            100_000_000,
            &address,
            1_000,
            network,
            ScriptKind::P2pkh,
        )
        .unwrap();

        let raw = sign_transaction(&unsigned, &test_key(network)).unwrap();
        let signed: Transaction = bitcoin::consensus::deserialize(&raw).unwrap();

        assert_eq!(signed.input.len(), 2);
        for input in &signed.input {
            assert!(input.witness.is_empty());
            // DER sig (71-73 + push) and compressed key (33 + push).
            let len = input.script_sig.len();
            assert!((105..=108).contains(&len), "script_sig length {len}");
        }
    }

    #[test]
    fn sign_segwit_fills_witness() {
        let network = UtxoNetwork::BitcoinTestnet;
        let key = test_key(network);
        let pk: [u8; 33] = key.public_key().unwrap().to_bytes().try_into().unwrap();
        let address = pubkey_to_p2wpkh_address(&pk, network).unwrap();
        let script = address_to_script(&address, network).unwrap();
        let utxos = vec![make_test_utxo(&"ab".repeat(32), 0, 200_000, &script)];

        let unsigned = build_transaction(
            &utxos,
            &address,
            100_000,
            &address,
            2,
            network,
            ScriptKind::P2wpkh,
        )
        .unwrap();

        let raw = sign_transaction(&unsigned, &key).unwrap();
        let signed: Transaction = bitcoin::consensus::deserialize(&raw).unwrap();
        assert_eq!(signed.input[0].witness.len(), 2);
        assert!(signed.input[0].script_sig.is_empty());
    }

    #[test]
    fn sign_with_invalid_key_fails() {
        let (address, script) = legacy_address(UtxoNetwork::Bitcoin);
        let utxos = vec![make_test_utxo(&"a".repeat(64), 0, 100_000, &script)];
        let unsigned = build_transaction(
            &utxos,
            &address,
            50_000,
            &address,
            1,
            UtxoNetwork::Bitcoin,
            ScriptKind::P2pkh,
        )
        .unwrap();

        let bad = WifKey {
            secret: [0u8; 32],
            compressed: true,
        };
        assert!(sign_transaction(&unsigned, &bad).is_err());
    }
}
