use bitcoin::{Amount, OutPoint, ScriptBuf, TxOut, Txid};

use crate::error::BtcError;
use crate::transaction::{estimate_fee, ScriptKind};

/// An unspent output owned by the wallet address.
#[derive(Debug, Clone, PartialEq)]
pub struct Utxo {
    /// Funding transaction id in display (big-endian) hex.
    pub txid: String,
    pub vout: u32,
    /// Value in the chain's base unit (satoshi, litoshi, koinu).
    pub amount_sat: u64,
    /// Serialized scriptPubKey of the output.
    pub script_pubkey: Vec<u8>,
}

impl Utxo {
    pub fn outpoint(&self) -> Result<OutPoint, BtcError> {
        let txid: Txid = self
            .txid
            .parse()
            .map_err(|e| BtcError::TransactionBuildError(format!("invalid txid {}: {e}", self.txid)))?;
        Ok(OutPoint::new(txid, self.vout))
    }

    /// The output being spent, as the sighash needs it.
    pub fn prevout(&self) -> TxOut {
        TxOut {
            value: Amount::from_sat(self.amount_sat),
            script_pubkey: ScriptBuf::from(self.script_pubkey.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UtxoSelection {
    pub selected: Vec<Utxo>,
    pub total_sat: u64,
}

/// Picks inputs largest-first until they cover `target_sat` plus the fee for
/// the chosen inputs and two outputs.
///
/// Outputs worth no more than the fee to spend them are never picked.
pub fn select_utxos(
    utxos: &[Utxo],
    target_sat: u64,
    fee_rate_sat_vbyte: u64,
    kind: ScriptKind,
) -> Result<UtxoSelection, BtcError> {
    if utxos.is_empty() {
        return Err(BtcError::TransactionBuildError("no UTXOs available".into()));
    }

    let input_cost = kind.input_vbytes().saturating_mul(fee_rate_sat_vbyte);
    let mut candidates: Vec<&Utxo> = utxos.iter().filter(|u| u.amount_sat > input_cost).collect();
    candidates.sort_by_key(|u| std::cmp::Reverse(u.amount_sat));

    let mut selection = UtxoSelection {
        selected: Vec::new(),
        total_sat: 0,
    };
    let mut needed = target_sat;

    for utxo in candidates {
        selection.selected.push(utxo.clone());
        selection.total_sat = selection.total_sat.saturating_add(utxo.amount_sat);

        let fee = estimate_fee(kind, selection.selected.len(), 2, fee_rate_sat_vbyte);
        needed = target_sat.saturating_add(fee);
        if selection.total_sat >= needed {
            return Ok(selection);
        }
    }

    Err(BtcError::TransactionBuildError(format!(
        "insufficient funds: have {} sat spendable, need {needed} sat",
        selection.total_sat
    )))
}
