use alloy_primitives::{I256, U256};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::descriptor::CoinDescriptor;
use crate::error::HandlerError;
use crate::keys::MasterSeed;
use crate::notify::Notifier;
use crate::units;

/// Balance of one address in system units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    pub confirmed: U256,
    /// Net effect of unconfirmed transactions; negative while a spend is pending.
    pub pending: I256,
}

/// One fee level. `rate` is sat/byte for UTXO coins and wei/gas for EVM coins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeOption {
    pub rate: U256,
    pub est_minutes: f64,
}

/// Uniform wallet operations over one coin.
#[async_trait]
pub trait CoinHandler: Send + Sync {
    fn descriptor(&self) -> &CoinDescriptor;

    /// A fresh random private key in the coin's key format.
    fn new_random_private_key(&self) -> Result<SecretString, HandlerError>;

    /// The key at the descriptor's derivation path.
    fn new_private_key(&self, seed: &MasterSeed) -> Result<SecretString, HandlerError>;

    fn address_from_private_key(&self, private_key: &SecretString) -> Result<String, HandlerError>;

    fn validate_address(&self, address: &str) -> bool;

    /// Seed for a deterministic avatar, where the coin defines one.
    fn identicon_seed(&self, _address: &str) -> Option<u32> {
        None
    }

    async fn get_balance(&self, address: &str) -> Result<Balance, HandlerError>;

    /// Fee levels ordered slowest to fastest.
    async fn get_fees(&self) -> Result<Vec<FeeOption>, HandlerError>;

    /// Total network fee for a standard payment at `fee`, in fee-coin units.
    fn fee_total_cost(&self, fee: &FeeOption) -> U256;

    /// `[~]<amount> <CODE>` in the fee coin's display units.
    fn fee_display(&self, fee: &FeeOption) -> String {
        let descriptor = self.descriptor();
        let (code, decimals) = descriptor.fee_unit();
        let amount = units::format_trimmed(
            self.fee_total_cost(fee),
            decimals,
            descriptor.display_precision,
        );
        let approx = if descriptor.fee_coin.is_some() { "~" } else { "" };
        format!("{approx}{amount} {code}")
    }

    /// Sign and broadcast a payment of `amount` system units; returns the txid.
    async fn send_payment(
        &self,
        private_key: &SecretString,
        receiver: &str,
        amount: U256,
        fee: &FeeOption,
    ) -> Result<String, HandlerError>;

    fn explorer_link_address(&self, address: &str) -> String {
        self.descriptor().explorer_link_address(address)
    }

    fn explorer_link_tx(&self, txid: &str) -> String {
        self.descriptor().explorer_link_tx(txid)
    }
}

/// Reports the outcome of a send through `notifier` and passes it through.
pub(crate) fn report_send(
    notifier: &dyn Notifier,
    code: &str,
    result: Result<String, HandlerError>,
) -> Result<String, HandlerError> {
    match &result {
        Ok(txid) => notifier.success(code, &format!("Successfully sent transaction. TXN: {txid}")),
        Err(e) => notifier.error(code, &e.to_string()),
    }
    result
}

/// Reports backend failures during a balance lookup and passes the result through.
pub(crate) fn report_balance(
    notifier: &dyn Notifier,
    code: &str,
    result: Result<Balance, HandlerError>,
) -> Result<Balance, HandlerError> {
    if let Err(e) = &result {
        if e.is_network() {
            notifier.network_unavailable(code);
        }
    }
    result
}
