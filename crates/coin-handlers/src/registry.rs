use std::sync::Arc;

use chain_btc::api::{BlockCypherClient, UtxoApi};
use chain_eth::network::EvmNetwork;
use chain_eth::rpc::{EvmApi, JsonRpcClient};
use tracing::info;

use crate::catalog;
use crate::config::WalletConfig;
use crate::descriptor::{CoinDescriptor, ListingDescriptor, NetworkSelection, TokenSpec};
use crate::error::HandlerError;
use crate::fee_cache::FeeCache;
use crate::handler::CoinHandler;
use crate::handlers::{Erc20Handler, EvmHandler, UtxoHandler};
use crate::notify::Notifier;

/// Chain backends shared by every handler in a registry.
#[derive(Clone)]
pub struct Backends {
    pub utxo: Arc<dyn UtxoApi>,
    pub mainnet: Arc<dyn EvmApi>,
    pub sepolia: Arc<dyn EvmApi>,
    pub fee_cache: Arc<FeeCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl Backends {
    pub fn from_config(
        config: &WalletConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, HandlerError> {
        let timeout = config.http_timeout;
        let rpc = |network: EvmNetwork| {
            JsonRpcClient::new(config.rpc_url(network), timeout)
                .map_err(|e| HandlerError::Config(e.to_string()))
        };
        let utxo = BlockCypherClient::new(
            config.blockcypher_url.clone(),
            config.blockcypher_token.clone(),
            timeout,
        )
        .map_err(|e| HandlerError::Config(e.to_string()))?;

        Ok(Self {
            utxo: Arc::new(utxo),
            mainnet: Arc::new(rpc(EvmNetwork::Mainnet)?),
            sepolia: Arc::new(rpc(EvmNetwork::Sepolia)?),
            fee_cache: Arc::new(FeeCache::new(config.fee_cache_ttl)),
            notifier,
        })
    }

    fn evm(&self, network: EvmNetwork) -> Arc<dyn EvmApi> {
        match network {
            EvmNetwork::Mainnet => Arc::clone(&self.mainnet),
            EvmNetwork::Sepolia => Arc::clone(&self.sepolia),
        }
    }

    fn handler_for(&self, descriptor: CoinDescriptor) -> Result<Arc<dyn CoinHandler>, HandlerError> {
        let notifier = Arc::clone(&self.notifier);
        let network = descriptor.network;
        let handler: Arc<dyn CoinHandler> = match network {
            NetworkSelection::Utxo(_) => Arc::new(UtxoHandler::new(
                descriptor,
                Arc::clone(&self.utxo),
                Arc::clone(&self.fee_cache),
                notifier,
            )?),
            NetworkSelection::Evm(network) if descriptor.contract.is_some() => {
                Arc::new(Erc20Handler::new(descriptor, self.evm(network), notifier)?)
            }
            NetworkSelection::Evm(network) => {
                Arc::new(EvmHandler::new(descriptor, self.evm(network), notifier)?)
            }
        };
        Ok(handler)
    }
}

/// All operable coins plus listing-only entries, in display order.
#[derive(Default)]
pub struct CoinRegistry {
    handlers: Vec<Arc<dyn CoinHandler>>,
    listings: Vec<ListingDescriptor>,
}

impl CoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in coin and every token from the config's tokens file.
    pub fn from_config(
        config: &WalletConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, HandlerError> {
        let tokens = config.load_tokens()?;
        Self::with_backends(&Backends::from_config(config, notifier)?, tokens)
    }

    pub fn with_backends(backends: &Backends, tokens: Vec<TokenSpec>) -> Result<Self, HandlerError> {
        let mut registry = Self::new();
        for descriptor in catalog::builtins() {
            registry.register(backends.handler_for(descriptor)?)?;
        }
        for token in tokens {
            registry.register(backends.handler_for(token.into_descriptor()?)?)?;
        }
        for listing in catalog::listings() {
            registry.add_listing(listing)?;
        }
        info!(
            handlers = registry.handlers.len(),
            listings = registry.listings.len(),
            "coin registry ready"
        );
        Ok(registry)
    }

    fn is_taken(&self, name: &str, code: &str) -> bool {
        let handler_clash = self.handlers.iter().any(|h| {
            let d = h.descriptor();
            d.name == name || d.code.eq_ignore_ascii_case(code)
        });
        let listing_clash = self
            .listings
            .iter()
            .any(|l| l.name == name || l.code.eq_ignore_ascii_case(code));
        handler_clash || listing_clash
    }

    /// Adds a handler. Names and codes must be unique across the registry.
    pub fn register(&mut self, handler: Arc<dyn CoinHandler>) -> Result<(), HandlerError> {
        let descriptor = handler.descriptor();
        if self.is_taken(&descriptor.name, &descriptor.code) {
            return Err(HandlerError::Config(format!(
                "duplicate coin {} ({})",
                descriptor.code, descriptor.name
            )));
        }
        self.handlers.push(handler);
        Ok(())
    }

    pub fn add_listing(&mut self, listing: ListingDescriptor) -> Result<(), HandlerError> {
        if self.is_taken(&listing.name, &listing.code) {
            return Err(HandlerError::Config(format!(
                "duplicate coin {} ({})",
                listing.code, listing.name
            )));
        }
        self.listings.push(listing);
        Ok(())
    }

    /// Looks up a handler by code (case-insensitive) or by name.
    pub fn get(&self, key: &str) -> Option<Arc<dyn CoinHandler>> {
        self.handlers
            .iter()
            .find(|h| {
                let d = h.descriptor();
                d.code.eq_ignore_ascii_case(key) || d.name == key
            })
            .cloned()
    }

    /// Like [`CoinRegistry::get`], but reports listing-only coins as unsupported.
    pub fn require(&self, key: &str) -> Result<Arc<dyn CoinHandler>, HandlerError> {
        if let Some(handler) = self.get(key) {
            return Ok(handler);
        }
        match self
            .listings
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(key) || l.name == key)
        {
            Some(listing) => Err(HandlerError::Unsupported {
                code: listing.code.clone(),
                operation: "chain operations",
            }),
            None => Err(HandlerError::UnknownCoin(key.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CoinHandler>> {
        self.handlers.iter()
    }

    pub fn listings(&self) -> &[ListingDescriptor] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
