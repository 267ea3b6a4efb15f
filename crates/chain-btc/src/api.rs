//! Chain data access for UTXO networks (BlockCypher compatible).
//!
//! Provides async access to:
//! - Address balances (confirmed and unconfirmed)
//! - Spendable UTXOs with their locking scripts
//! - Fee estimates per kB
//! - Transaction broadcasting

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BtcError;
use crate::network::UtxoNetwork;
use crate::utxo::Utxo;

/// Largest page BlockCypher serves for an address query.
pub const UTXO_PAGE_LIMIT: u32 = 2000;

/// Upper bound on pages fetched for one address.
const MAX_UTXO_PAGES: usize = 50;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API types
// ============================================================================

/// Address balance in base units. `unconfirmed` may be negative while a
/// spend sits in the mempool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBalance {
    pub confirmed: i64,
    pub unconfirmed: i64,
}

/// Fee estimates in base units per kilobyte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeePerKb {
    #[serde(rename = "low_fee_per_kb", default)]
    pub low: u64,
    #[serde(rename = "medium_fee_per_kb", default)]
    pub medium: u64,
    #[serde(rename = "high_fee_per_kb", default)]
    pub high: u64,
}

impl FeePerKb {
    /// Per-kB rates converted to per-byte, rounded up, never below 1.
    pub fn per_byte(&self) -> [u64; 3] {
        [self.low, self.medium, self.high].map(|kb| kb.div_ceil(1000).max(1))
    }
}

/// Read and broadcast access to a UTXO chain.
#[async_trait]
pub trait UtxoApi: Send + Sync {
    async fn balance(&self, network: UtxoNetwork, address: &str)
        -> Result<AddressBalance, BtcError>;

    /// Unspent outputs of `address`, including their locking scripts.
    async fn utxos(&self, network: UtxoNetwork, address: &str) -> Result<Vec<Utxo>, BtcError>;

    async fn fee_estimates(&self, network: UtxoNetwork) -> Result<FeePerKb, BtcError>;

    /// Broadcast a serialized signed transaction; returns the txid.
    async fn broadcast(&self, network: UtxoNetwork, raw_tx: &[u8]) -> Result<String, BtcError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: i64,
    #[serde(default)]
    unconfirmed_balance: i64,
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    txrefs: Vec<TxRef>,
    #[serde(default)]
    unconfirmed_txrefs: Vec<TxRef>,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct TxRef {
    tx_hash: String,
    tx_output_n: i64,
    value: u64,
    #[serde(default)]
    script: Option<String>,
    /// -1 while unconfirmed.
    #[serde(default)]
    block_height: i64,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    tx: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    tx: PushedTx,
}

#[derive(Debug, Deserialize)]
struct PushedTx {
    hash: String,
}

// ============================================================================
// BlockCypher client
// ============================================================================

/// Async client for the BlockCypher REST API.
pub struct BlockCypherClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl BlockCypherClient {
    /// Every request, including a stalled body read, fails after `timeout`.
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BtcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BtcError::Api(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, network: UtxoNetwork, path: &str) -> String {
        let mut url = format!("{}/{}{}", self.api_base, network.params().api_path, path);
        if let Some(token) = &self.token {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str("token=");
            url.push_str(token);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BtcError> {
        debug!(url = %redact(url), "blockcypher request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BtcError::Api(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BtcError::Api(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| BtcError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UtxoApi for BlockCypherClient {
    async fn balance(
        &self,
        network: UtxoNetwork,
        address: &str,
    ) -> Result<AddressBalance, BtcError> {
        let url = self.url(network, &format!("/addrs/{address}/balance"));
        let resp: BalanceResponse = self.get_json(&url).await?;
        Ok(AddressBalance {
            confirmed: resp.balance,
            unconfirmed: resp.unconfirmed_balance,
        })
    }

    async fn utxos(&self, network: UtxoNetwork, address: &str) -> Result<Vec<Utxo>, BtcError> {
        let mut pages = UtxoPages::default();
        let mut before = None;

        for _ in 0..MAX_UTXO_PAGES {
            let url = self.url(network, &utxo_page_path(address, before));
            let resp: AddressResponse = self.get_json(&url).await?;
            match pages.absorb(resp, before)? {
                Some(next) => {
                    debug!(%network, address, before = next, "fetching next utxo page");
                    before = Some(next);
                }
                None => {
                    let utxos = pages.utxos;
                    debug!(%network, address, count = utxos.len(), "fetched utxos");
                    return Ok(utxos);
                }
            }
        }

        Err(BtcError::Api(format!(
            "{address} has more than {MAX_UTXO_PAGES} pages of unspent outputs"
        )))
    }

    async fn fee_estimates(&self, network: UtxoNetwork) -> Result<FeePerKb, BtcError> {
        let url = self.url(network, "");
        self.get_json(&url).await
    }

    async fn broadcast(&self, network: UtxoNetwork, raw_tx: &[u8]) -> Result<String, BtcError> {
        let url = self.url(network, "/txs/push");
        let tx_hex = hex::encode(raw_tx);

        let response = self
            .client
            .post(&url)
            .json(&PushRequest { tx: &tx_hex })
            .send()
            .await
            .map_err(|e| BtcError::Api(format!("broadcast failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BtcError::Api(format!("broadcast error {status}: {body}")));
        }

        let pushed: PushResponse = response
            .json()
            .await
            .map_err(|e| BtcError::Decode(e.to_string()))?;

        info!(%network, txid = %pushed.tx.hash, "broadcast transaction");
        Ok(pushed.tx.hash)
    }
}

fn utxo_page_path(address: &str, before: Option<i64>) -> String {
    let mut path =
        format!("/addrs/{address}?unspentOnly=true&includeScript=true&limit={UTXO_PAGE_LIMIT}");
    if let Some(height) = before {
        path.push_str(&format!("&before={height}"));
    }
    path
}

/// Unspent outputs gathered across `hasMore` pages, each output kept once.
#[derive(Default)]
struct UtxoPages {
    seen: HashSet<(String, u32)>,
    utxos: Vec<Utxo>,
}

impl UtxoPages {
    /// Adds one page; returns the `before` height of the next page, or
    /// `None` once the listing is complete.
    ///
    /// A page can end partway through a block, so the next page restarts
    /// at the lowest height seen and repeats are dropped.
    fn absorb(
        &mut self,
        page: AddressResponse,
        before: Option<i64>,
    ) -> Result<Option<i64>, BtcError> {
        let lowest = page
            .txrefs
            .iter()
            .map(|t| t.block_height)
            .filter(|h| *h >= 0)
            .min();

        for txref in page.txrefs.into_iter().chain(page.unconfirmed_txrefs) {
            let utxo = txref_to_utxo(txref)?;
            if self.seen.insert((utxo.txid.clone(), utxo.vout)) {
                self.utxos.push(utxo);
            }
        }

        if !page.has_more {
            return Ok(None);
        }

        let next = lowest.map(|h| h + 1);
        match (next, before) {
            (Some(next), Some(before)) if next < before => Ok(Some(next)),
            (Some(next), None) => Ok(Some(next)),
            _ => Err(BtcError::Api(
                "unspent output listing does not advance past a single block".into(),
            )),
        }
    }
}

fn txref_to_utxo(txref: TxRef) -> Result<Utxo, BtcError> {
    let script = txref
        .script
        .ok_or_else(|| BtcError::Decode(format!("utxo {} has no script", txref.tx_hash)))?;
    let script_pubkey =
        hex::decode(&script).map_err(|e| BtcError::Decode(format!("utxo script: {e}")))?;
    let vout = u32::try_from(txref.tx_output_n)
        .map_err(|_| BtcError::Decode(format!("utxo output index {}", txref.tx_output_n)))?;

    Ok(Utxo {
        txid: txref.tx_hash,
        vout,
        amount_sat: txref.value,
        script_pubkey,
    })
}

fn redact(url: &str) -> &str {
    url.split_once("token=").map_or(url, |(head, _)| head)
}
