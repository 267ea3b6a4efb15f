//! Ethereum JSON-RPC access.
//!
//! Only the handful of calls a wallet needs: balances, read-only contract
//! calls, gas price, nonce and raw transaction broadcast.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::EthError;

/// Read and broadcast access to one EVM network.
#[async_trait]
pub trait EvmApi: Send + Sync {
    /// Latest balance in wei.
    async fn balance(&self, address: Address) -> Result<U256, EthError>;

    /// `eth_call` against the latest block; returns the raw return data.
    async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, EthError>;

    async fn gas_price(&self) -> Result<U256, EthError>;

    /// Next nonce, counting pending transactions.
    async fn transaction_count(&self, address: Address) -> Result<u64, EthError>;

    /// Broadcast a signed raw transaction; returns the transaction hash.
    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client over HTTP.
pub struct JsonRpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Requests that get no complete answer within `timeout` fail with
    /// [`EthError::Rpc`].
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EthError::Rpc(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, EthError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EthError::Rpc(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EthError::Rpc(format!("http {status}: {body}")));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| EthError::Rpc(format!("failed to parse response: {e}")))?;

        unwrap_response(parsed)
    }
}

#[async_trait]
impl EvmApi for JsonRpcClient {
    async fn balance(&self, address: Address) -> Result<U256, EthError> {
        let hex: String = self
            .request("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        parse_quantity(&hex)
    }

    async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, EthError> {
        let call = json!({
            "to": to.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        });
        let hex: String = self.request("eth_call", json!([call, "latest"])).await?;
        parse_data(&hex)
    }

    async fn gas_price(&self) -> Result<U256, EthError> {
        let hex: String = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(&hex)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, EthError> {
        let hex: String = self
            .request(
                "eth_getTransactionCount",
                json!([address.to_string(), "pending"]),
            )
            .await?;
        let count = parse_quantity(&hex)?;
        u64::try_from(count).map_err(|_| EthError::Rpc(format!("nonce out of range: {hex}")))
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        let hash: String = self
            .request(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw_tx))]),
            )
            .await?;
        info!(tx_hash = %hash, "broadcast transaction");
        Ok(hash)
    }
}

fn unwrap_response<T>(response: RpcResponse<T>) -> Result<T, EthError> {
    if let Some(error) = response.error {
        return Err(EthError::Rpc(format!("{}: {}", error.code, error.message)));
    }
    response
        .result
        .ok_or_else(|| EthError::Rpc("null result".into()))
}

/// Parses a hex QUANTITY (`0x`-prefixed, no leading zeros required).
pub fn parse_quantity(hex: &str) -> Result<U256, EthError> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| EthError::Rpc(format!("quantity without 0x prefix: {hex}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|e| EthError::Rpc(format!("bad quantity {hex}: {e}")))
}

fn parse_data(hex: &str) -> Result<Vec<u8>, EthError> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| EthError::Rpc(format!("data without 0x prefix: {hex}")))?;
    hex::decode(digits).map_err(|e| EthError::Rpc(format!("bad data: {e}")))
}
