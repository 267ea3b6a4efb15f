//! Handler for Bitcoin-family coins (BTC, BTC.TST, LTC, DOGE).

use std::sync::Arc;

use alloy_primitives::{I256, U256};
use async_trait::async_trait;
use chain_btc::address::{decode_wif, encode_wif, p2pkh_address, validate_address};
use chain_btc::api::UtxoApi;
use chain_btc::network::UtxoNetwork;
use chain_btc::transaction::{build_transaction, estimate_vsize, sign_transaction, ScriptKind};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::descriptor::{CoinDescriptor, NetworkSelection};
use crate::error::HandlerError;
use crate::fee_cache::FeeCache;
use crate::handler::{report_balance, report_send, Balance, CoinHandler, FeeOption};
use crate::keys::{derive_secp256k1_key, random_secp256k1_key, MasterSeed};
use crate::notify::Notifier;

/// Confirmation targets, in blocks, for the low, medium and high fee levels.
const FEE_TARGET_BLOCKS: [f64; 3] = [7.0, 3.0, 1.0];

/// Spends are built as legacy P2PKH, matching the addresses this handler hands out.
const SPEND_KIND: ScriptKind = ScriptKind::P2pkh;

pub struct UtxoHandler {
    descriptor: CoinDescriptor,
    network: UtxoNetwork,
    api: Arc<dyn UtxoApi>,
    fee_cache: Arc<FeeCache>,
    notifier: Arc<dyn Notifier>,
}

impl UtxoHandler {
    pub fn new(
        descriptor: CoinDescriptor,
        api: Arc<dyn UtxoApi>,
        fee_cache: Arc<FeeCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, HandlerError> {
        let NetworkSelection::Utxo(network) = descriptor.network else {
            return Err(HandlerError::Config(format!(
                "{} is not a UTXO coin",
                descriptor.code
            )));
        };
        Ok(Self {
            descriptor,
            network,
            api,
            fee_cache,
            notifier,
        })
    }

    pub fn network(&self) -> UtxoNetwork {
        self.network
    }

    async fn fetch_fees(&self) -> Result<Vec<FeeOption>, HandlerError> {
        let estimates = self.api.fee_estimates(self.network).await?;
        let block_minutes = self.network.params().block_minutes;

        Ok(estimates
            .per_byte()
            .into_iter()
            .zip(FEE_TARGET_BLOCKS)
            .map(|(rate, blocks)| FeeOption {
                rate: U256::from(rate),
                est_minutes: blocks * block_minutes,
            })
            .collect())
    }

    async fn send(
        &self,
        private_key: &SecretString,
        receiver: &str,
        amount: U256,
        fee: &FeeOption,
    ) -> Result<String, HandlerError> {
        let amount_sat = u64::try_from(amount)
            .map_err(|_| HandlerError::InvalidAmount(format!("{amount} exceeds u64")))?;
        let fee_rate = u64::try_from(fee.rate)
            .map_err(|_| HandlerError::InvalidAmount(format!("fee rate {} exceeds u64", fee.rate)))?;

        let key = decode_wif(private_key.expose_secret(), self.network)?;
        let sender = p2pkh_address(&key.public_key()?, self.network);

        let utxos = self.api.utxos(self.network, &sender).await?;
        debug!(coin = %self.descriptor.code, count = utxos.len(), "fetched utxos");

        self.notifier.info(&self.descriptor.code, "signing transaction...");
        let unsigned = build_transaction(
            &utxos,
            receiver,
            amount_sat,
            &sender,
            fee_rate,
            self.network,
            SPEND_KIND,
        )?;
        let raw_tx = sign_transaction(&unsigned, &key)?;

        self.notifier
            .info(&self.descriptor.code, "sending transaction to network...");
        Ok(self.api.broadcast(self.network, &raw_tx).await?)
    }
}

#[async_trait]
impl CoinHandler for UtxoHandler {
    fn descriptor(&self) -> &CoinDescriptor {
        &self.descriptor
    }

    fn new_random_private_key(&self) -> Result<SecretString, HandlerError> {
        let secret = random_secp256k1_key();
        Ok(SecretString::from(encode_wif(&secret, self.network)))
    }

    fn new_private_key(&self, seed: &MasterSeed) -> Result<SecretString, HandlerError> {
        let key = derive_secp256k1_key(seed, &self.descriptor.derivation_path)?;
        Ok(SecretString::from(encode_wif(&key.private_key, self.network)))
    }

    fn address_from_private_key(&self, private_key: &SecretString) -> Result<String, HandlerError> {
        let key = decode_wif(private_key.expose_secret(), self.network)?;
        Ok(p2pkh_address(&key.public_key()?, self.network))
    }

    fn validate_address(&self, address: &str) -> bool {
        validate_address(address, self.network)
    }

    async fn get_balance(&self, address: &str) -> Result<Balance, HandlerError> {
        let result: Result<Balance, HandlerError> = async {
            let balance = self.api.balance(self.network, address).await?;
            let confirmed = u64::try_from(balance.confirmed).unwrap_or(0);
            Ok(Balance {
                confirmed: U256::from(confirmed),
                pending: I256::try_from(balance.unconfirmed)
                    .map_err(|e| HandlerError::Network(format!("bad unconfirmed balance: {e}")))?,
            })
        }
        .await;
        report_balance(self.notifier.as_ref(), &self.descriptor.code, result)
    }

    async fn get_fees(&self) -> Result<Vec<FeeOption>, HandlerError> {
        self.fee_cache
            .get_or_fetch(&self.descriptor.name, || self.fetch_fees())
            .await
    }

    fn fee_total_cost(&self, fee: &FeeOption) -> U256 {
        fee.rate.saturating_mul(U256::from(estimate_vsize(SPEND_KIND, 1, 2)))
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
