//! Handler for native ether (ETH, ETH.TST).

use std::sync::Arc;

use alloy_primitives::{Address, I256, U256};
use async_trait::async_trait;
use chain_eth::address::{identicon_seed, parse_address, private_key_to_address, validate_address};
use chain_eth::network::EvmNetwork;
use chain_eth::rpc::EvmApi;
use chain_eth::transaction::{build_transfer, sign_transaction, TRANSFER_GAS_LIMIT};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::descriptor::{CoinDescriptor, NetworkSelection};
use crate::error::HandlerError;
use crate::handler::{report_balance, report_send, Balance, CoinHandler, FeeOption};
use crate::keys::{derive_secp256k1_key, random_secp256k1_key, MasterSeed};
use crate::notify::Notifier;

/// Gas price multipliers as (numerator, denominator), slowest first.
const GAS_PRICE_STEPS: [(u64, u64); 5] = [(1, 2), (3, 4), (1, 1), (3, 2), (2, 1)];
/// Estimated confirmation minutes for each step in [`GAS_PRICE_STEPS`].
const GAS_PRICE_MINUTES: [f64; 5] = [8.77, 2.86, 2.43, 0.62, 0.6];

/// Five fee levels around the node's current gas price.
pub(crate) fn gas_price_ladder(gas_price: U256) -> Vec<FeeOption> {
    GAS_PRICE_STEPS
        .iter()
        .zip(GAS_PRICE_MINUTES)
        .map(|(&(num, den), est_minutes)| FeeOption {
            rate: gas_price.saturating_mul(U256::from(num)) / U256::from(den),
            est_minutes,
        })
        .collect()
}

/// `0x` + 64 lowercase hex characters.
pub(crate) fn format_private_key(secret: &[u8; 32]) -> SecretString {
    SecretString::from(format!("0x{}", hex::encode(secret)))
}

/// Parses a hex private key, with or without `0x`, left-padding short keys.
pub(crate) fn parse_private_key(key: &SecretString) -> Result<Zeroizing<[u8; 32]>, HandlerError> {
    let text = key.expose_secret().trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || digits.len() > 64 {
        return Err(HandlerError::InvalidKey(format!(
            "expected up to 64 hex characters, got {}",
            digits.len()
        )));
    }

    let padded = Zeroizing::new(format!("{digits:0>64}"));
    let mut out = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(padded.as_str(), out.as_mut_slice())
        .map_err(|e| HandlerError::InvalidKey(format!("invalid hex: {e}")))?;
    Ok(out)
}

pub(crate) fn evm_network(descriptor: &CoinDescriptor) -> Result<EvmNetwork, HandlerError> {
    match descriptor.network {
        NetworkSelection::Evm(network) => Ok(network),
        NetworkSelection::Utxo(_) => Err(HandlerError::Config(format!(
            "{} is not an EVM coin",
            descriptor.code
        ))),
    }
}

pub(crate) fn gas_price_u128(rate: U256) -> Result<u128, HandlerError> {
    u128::try_from(rate).map_err(|_| HandlerError::InvalidAmount(format!("gas price {rate} exceeds u128")))
}

pub(crate) fn sender_address(secret: &[u8; 32]) -> Result<Address, HandlerError> {
    Ok(parse_address(&private_key_to_address(secret)?)?)
}

pub struct EvmHandler {
    descriptor: CoinDescriptor,
    network: EvmNetwork,
    api: Arc<dyn EvmApi>,
    notifier: Arc<dyn Notifier>,
}

impl EvmHandler {
    pub fn new(
        descriptor: CoinDescriptor,
        api: Arc<dyn EvmApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, HandlerError> {
        let network = evm_network(&descriptor)?;
        Ok(Self {
            descriptor,
            network,
            api,
            notifier,
        })
    }

    fn gas_limit(&self) -> u64 {
        self.descriptor.gas_limit.unwrap_or(TRANSFER_GAS_LIMIT)
    }

    async fn send(
        &self,
        private_key: &SecretString,
        receiver: &str,
        amount: U256,
        fee: &FeeOption,
    ) -> Result<String, HandlerError> {
        let secret = parse_private_key(private_key)?;
        let from = sender_address(&secret)?;
        let to = parse_address(receiver)?;
        let gas_price = gas_price_u128(fee.rate)?;

        let nonce = self.api.transaction_count(from).await?;

        self.notifier.info(&self.descriptor.code, "signing transaction...");
        let tx = build_transfer(
            self.network.chain_id(),
            nonce,
            to,
            amount,
            gas_price,
            self.gas_limit(),
        );
        let signed = sign_transaction(&tx, &secret)?;

        self.notifier
            .info(&self.descriptor.code, "sending transaction to network...");
        Ok(self.api.send_raw_transaction(&signed.raw_tx).await?)
    }
}

#[async_trait]
impl CoinHandler for EvmHandler {
    fn descriptor(&self) -> &CoinDescriptor {
        &self.descriptor
    }

    fn new_random_private_key(&self) -> Result<SecretString, HandlerError> {
        Ok(format_private_key(&random_secp256k1_key()))
    }

    fn new_private_key(&self, seed: &MasterSeed) -> Result<SecretString, HandlerError> {
        let key = derive_secp256k1_key(seed, &self.descriptor.derivation_path)?;
        Ok(format_private_key(&key.private_key))
    }

    fn address_from_private_key(&self, private_key: &SecretString) -> Result<String, HandlerError> {
        let secret = parse_private_key(private_key)?;
        Ok(private_key_to_address(&secret)?)
    }

    fn validate_address(&self, address: &str) -> bool {
        validate_address(address)
    }

    fn identicon_seed(&self, address: &str) -> Option<u32> {
        identicon_seed(address)
    }

    async fn get_balance(&self, address: &str) -> Result<Balance, HandlerError> {
        let result: Result<Balance, HandlerError> = async {
            let owner = parse_address(address)?;
            Ok(Balance {
                confirmed: self.api.balance(owner).await?,
                pending: I256::ZERO,
            })
        }
        .await;
        report_balance(self.notifier.as_ref(), &self.descriptor.code, result)
    }

    async fn get_fees(&self) -> Result<Vec<FeeOption>, HandlerError> {
        Ok(gas_price_ladder(self.api.gas_price().await?))
    }

    fn fee_total_cost(&self, fee: &FeeOption) -> U256 {
        fee.rate.saturating_mul(U256::from(self.gas_limit()))
    }

    async fn send_payment(
        &self,
        private_key: &SecretString,
        receiver: &str,
        amount: U256,
        fee: &FeeOption,
    ) -> Result<String, HandlerError> {
        let result = self.send(private_key, receiver, amount, fee).await;
        report_send(self.notifier.as_ref(), &self.descriptor.code, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_scales_gas_price_exactly() {
        let ladder = gas_price_ladder(U256::from(20_000_000_001u64));
        let rates: Vec<U256> = ladder.iter().map(|f| f.rate).collect();
        assert_eq!(
            rates,
            [
                U256::from(10_000_000_000u64),
                U256::from(15_000_000_000u64),
                U256::from(20_000_000_001u64),
                U256::from(30_000_000_001u64),
                U256::from(40_000_000_002u64),
            ]
        );
        assert_eq!(ladder[0].est_minutes, 8.77);
        assert_eq!(ladder[4].est_minutes, 0.6);
    }

    #[test]
    fn private_key_is_padded_hex() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let formatted = format_private_key(&secret);
        assert_eq!(
            formatted.expose_secret(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(*parse_private_key(&formatted).unwrap(), secret);
    }

    #[test]
    fn short_and_unprefixed_keys_parse() {
        let parsed = parse_private_key(&SecretString::from("0x1".to_string())).unwrap();
        assert_eq!(parsed[31], 1);
        assert!(parsed[..31].iter().all(|b| *b == 0));

        let parsed = parse_private_key(&SecretString::from("ff".to_string())).unwrap();
        assert_eq!(parsed[31], 0xff);
    }

    #[test]
    fn bad_keys_are_rejected() {
        assert!(parse_private_key(&SecretString::from("0x".to_string())).is_err());
        assert!(parse_private_key(&SecretString::from("0xzz".to_string())).is_err());
        assert!(parse_private_key(&SecretString::from(format!("0x{}", "1".repeat(65)))).is_err());
    }
}
