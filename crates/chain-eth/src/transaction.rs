use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{BufMut, Encodable, Header, EMPTY_LIST_CODE};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::erc20;
use crate::error::EthError;

/// EIP-2718 type byte for EIP-1559 transactions.
const EIP1559_TX_TYPE: u8 = 0x02;

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// An unsigned EIP-1559 (type 2) transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: Address,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata (empty for plain transfers).
    pub data: Bytes,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
pub struct SignedEthTransaction {
    /// `0x02 || rlp(signed fields)`.
    pub raw_tx: Vec<u8>,
    /// Transaction hash as a 0x-prefixed hex string.
    pub tx_hash: String,
}

/// Builds an unsigned value transfer.
///
/// Both fee caps are set to `gas_price`, which bounds the cost the same way a
/// legacy gas price does.
pub fn build_transfer(
    chain_id: u64,
    nonce: u64,
    to: Address,
    value_wei: U256,
    gas_price: u128,
    gas_limit: u64,
) -> EthTransaction {
    EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: gas_price,
        max_fee_per_gas: gas_price,
        gas_limit,
        to,
        value: value_wei,
        data: Bytes::new(),
    }
}

/// Builds an unsigned ERC-20 `transfer(to, amount)` call on `token_contract`.
pub fn build_erc20_transfer(
    chain_id: u64,
    nonce: u64,
    token_contract: Address,
    to: Address,
    amount: U256,
    gas_price: u128,
    gas_limit: u64,
) -> EthTransaction {
    EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: gas_price,
        max_fee_per_gas: gas_price,
        gas_limit,
        to: token_contract,
        value: U256::ZERO,
        data: erc20::encode_transfer(to, amount).into(),
    }
}

/// secp256k1 signature fields appended to a signed type-2 payload.
struct TxSignature {
    y_parity: u8,
    r: U256,
    s: U256,
}

impl TxSignature {
    fn length(&self) -> usize {
        self.y_parity.length() + self.r.length() + self.s.length()
    }

    fn encode(&self, out: &mut dyn BufMut) {
        self.y_parity.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }
}

impl EthTransaction {
    fn fields_length(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.max_priority_fee_per_gas.length()
            + self.max_fee_per_gas.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.data.length()
            + 1 // empty access list
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.data.encode(out);
        out.put_u8(EMPTY_LIST_CODE);
    }

    /// `0x02 || rlp([fields..., signature...])`.
    fn typed_payload(&self, signature: Option<&TxSignature>) -> Vec<u8> {
        let payload_length = self.fields_length() + signature.map_or(0, TxSignature::length);
        let header = Header {
            list: true,
            payload_length,
        };

        let mut out = Vec::with_capacity(1 + header.length() + payload_length);
        out.push(EIP1559_TX_TYPE);
        header.encode(&mut out);
        self.encode_fields(&mut out);
        if let Some(signature) = signature {
            signature.encode(&mut out);
        }
        out
    }
}

/// Signs an EIP-1559 transaction with a secp256k1 private key.
///
/// The signature covers `keccak256(encode_unsigned_tx(tx))`. The transaction
/// hash is `keccak256` of the signed raw bytes.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    let msg_hash = Keccak256::digest(encode_unsigned_tx(tx));
    let (signature, recovery_id) = sign_digest(private_key, &msg_hash[..])?;

    let signature = TxSignature {
        y_parity: recovery_id.is_y_odd() as u8,
        r: U256::from_be_slice(&signature.r().to_bytes()),
        s: U256::from_be_slice(&signature.s().to_bytes()),
    };

    let raw_tx = tx.typed_payload(Some(&signature));
    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

/// Encodes the signing payload `0x02 || rlp([chain_id, nonce,
/// max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to, value, data,
/// access_list])`.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Vec<u8> {
    tx.typed_payload(None)
}

fn sign_digest(private_key: &[u8; 32], hash: &[u8]) -> Result<(Signature, RecoveryId), EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();

    signing_key?
        .sign_prehash(hash)
        .map_err(|e| EthError::SigningError(e.to_string()))
}
