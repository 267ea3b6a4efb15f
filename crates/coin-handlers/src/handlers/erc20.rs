//! Handler for ERC-20 tokens. Fees are paid in the chain's native ether.

use std::sync::Arc;

use alloy_primitives::{Address, I256, U256};
use async_trait::async_trait;
use chain_eth::abi::decode_uint256;
use chain_eth::address::{identicon_seed, parse_address, private_key_to_address, validate_address};
use chain_eth::erc20::{encode_balance_of, DEFAULT_TRANSFER_GAS_LIMIT};
use chain_eth::network::EvmNetwork;
use chain_eth::rpc::EvmApi;
use chain_eth::transaction::{build_erc20_transfer, sign_transaction};
use secrecy::SecretString;
use tracing::warn;

use super::evm::{
    evm_network, format_private_key, gas_price_ladder, gas_price_u128, parse_private_key,
    sender_address,
};
use crate::descriptor::CoinDescriptor;
use crate::error::HandlerError;
use crate::handler::{report_balance, report_send, Balance, CoinHandler, FeeOption};
use crate::keys::{derive_secp256k1_key, random_secp256k1_key, MasterSeed};
use crate::notify::Notifier;

pub struct Erc20Handler {
    descriptor: CoinDescriptor,
    network: EvmNetwork,
    contract: Address,
    api: Arc<dyn EvmApi>,
    notifier: Arc<dyn Notifier>,
}

impl Erc20Handler {
    pub fn new(
        descriptor: CoinDescriptor,
        api: Arc<dyn EvmApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, HandlerError> {
        let network = evm_network(&descriptor)?;
        let contract = descriptor
            .contract
            .as_ref()
            .ok_or_else(|| {
                HandlerError::Config(format!("{} has no contract address", descriptor.code))
            })
            .and_then(|c| {
                parse_address(&c.address).map_err(|e| {
                    HandlerError::Config(format!("{} contract: {e}", descriptor.code))
                })
            })?;
        Ok(Self {
            descriptor,
            network,
            contract,
            api,
            notifier,
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    fn gas_limit(&self) -> u64 {
        self.descriptor.gas_limit.unwrap_or(DEFAULT_TRANSFER_GAS_LIMIT)
    }

    /// The configured gas limit, lowered to what the sender's ether balance
    /// can cover at `gas_price` when that is smaller.
    async fn affordable_gas_limit(&self, sender: Address, gas_price: U256) -> u64 {
        let gas_limit = self.gas_limit();
        if gas_price.is_zero() {
            return gas_limit;
        }

        let fee_balance = match self.api.balance(sender).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(coin = %self.descriptor.code, error = %e, "fee coin balance unavailable");
                return gas_limit;
            }
        };

        let max_gas = fee_balance / gas_price;
        if max_gas.is_zero() || max_gas >= U256::from(gas_limit) {
            return gas_limit;
        }

        let (fee_code, _) = self.descriptor.fee_unit();
        let message =
            format!("warning: {fee_code} balance low. Lowering gasLimit. Transaction might fail.");
        warn!(coin = %self.descriptor.code, %max_gas, gas_limit, "{message}");
        self.notifier.info(&self.descriptor.code, &message);
        u64::try_from(max_gas).unwrap_or(gas_limit)
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

        self.notifier.info(&self.descriptor.code, "signing transaction...");
        let gas_limit = self.affordable_gas_limit(from, fee.rate).await;
        let nonce = self.api.transaction_count(from).await?;

        let tx = build_erc20_transfer(
            self.network.chain_id(),
            nonce,
            self.contract,
            to,
            amount,
            gas_price,
            gas_limit,
        );
        let signed = sign_transaction(&tx, &secret)?;

        self.notifier
            .info(&self.descriptor.code, "sending transaction to network...");
        Ok(self.api.send_raw_transaction(&signed.raw_tx).await?)
    }
}

#[async_trait]
impl CoinHandler for Erc20Handler {
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
            let data = self.api.call(self.contract, &encode_balance_of(owner)).await?;
            Ok(Balance {
                confirmed: decode_uint256(&data)?,
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
