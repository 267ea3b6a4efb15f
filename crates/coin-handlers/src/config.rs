use std::path::PathBuf;
use std::time::Duration;

use chain_btc::api::DEFAULT_HTTP_TIMEOUT;
use chain_btc::network::BLOCKCYPHER_API;
use chain_eth::network::EvmNetwork;

use crate::descriptor::TokenSpec;
use crate::error::HandlerError;
use crate::fee_cache::DEFAULT_FEE_TTL;

/// Backend endpoints and tunables for the coin handlers.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub eth_rpc_url: String,
    pub eth_testnet_rpc_url: String,
    pub blockcypher_url: String,
    pub blockcypher_token: Option<String>,
    pub fee_cache_ttl: Duration,
    /// Applies to every chain backend request.
    pub http_timeout: Duration,
    /// JSON array of token definitions.
    pub tokens_file: Option<PathBuf>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            eth_rpc_url: EvmNetwork::Mainnet.chain().rpc_url.to_string(),
            eth_testnet_rpc_url: EvmNetwork::Sepolia.chain().rpc_url.to_string(),
            blockcypher_url: BLOCKCYPHER_API.to_string(),
            blockcypher_token: None,
            fee_cache_ttl: DEFAULT_FEE_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            tokens_file: None,
        }
    }
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, HandlerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HandlerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(api_key) = get("INFURA_API_KEY") {
            config.eth_rpc_url = EvmNetwork::Mainnet.infura_url(&api_key);
            config.eth_testnet_rpc_url = EvmNetwork::Sepolia.infura_url(&api_key);
        }

        if let Some(url) = get("ETH_RPC_URL") {
            config.eth_rpc_url = url;
        }

        if let Some(url) = get("ETH_TESTNET_RPC_URL") {
            config.eth_testnet_rpc_url = url;
        }

        if let Some(url) = get("BLOCKCYPHER_URL") {
            config.blockcypher_url = url;
        }

        config.blockcypher_token = get("BLOCKCYPHER_TOKEN");

        if let Some(ttl) = get("FEE_CACHE_TTL_SECS") {
            let secs: u64 = ttl.trim().parse().map_err(|e| {
                HandlerError::Config(format!("Invalid FEE_CACHE_TTL_SECS: {e}"))
            })?;
            config.fee_cache_ttl = Duration::from_secs(secs);
        }

        if let Some(timeout) = get("HTTP_TIMEOUT_SECS") {
            let secs: u64 = timeout.trim().parse().map_err(|e| {
                HandlerError::Config(format!("Invalid HTTP_TIMEOUT_SECS: {e}"))
            })?;
            if secs == 0 {
                return Err(HandlerError::Config(
                    "HTTP_TIMEOUT_SECS must be at least 1".into(),
                ));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        config.tokens_file = get("COIN_TOKENS_FILE").map(PathBuf::from);

        Ok(config)
    }

    pub fn rpc_url(&self, network: EvmNetwork) -> &str {
        match network {
            EvmNetwork::Mainnet => &self.eth_rpc_url,
            EvmNetwork::Sepolia => &self.eth_testnet_rpc_url,
        }
    }

    /// Token definitions from `tokens_file`, or none when unset.
    pub fn load_tokens(&self) -> Result<Vec<TokenSpec>, HandlerError> {
        let Some(path) = &self.tokens_file else {
            return Ok(Vec::new());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HandlerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            HandlerError::Config(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_public_endpoints() {
        let config = WalletConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.eth_rpc_url, "https://eth.llamarpc.com");
        assert_eq!(config.eth_testnet_rpc_url, "https://rpc.sepolia.org");
        assert_eq!(config.blockcypher_url, "https://api.blockcypher.com/v1");
        assert_eq!(config.fee_cache_ttl, Duration::from_secs(900));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.blockcypher_token.is_none());
        assert!(config.load_tokens().unwrap().is_empty());
    }

    #[test]
    fn infura_key_builds_both_urls() {
        let config = WalletConfig::from_lookup(lookup(&[("INFURA_API_KEY", "abc123")])).unwrap();
        assert_eq!(config.rpc_url(EvmNetwork::Mainnet), "https://mainnet.infura.io/v3/abc123");
        assert_eq!(config.rpc_url(EvmNetwork::Sepolia), "https://sepolia.infura.io/v3/abc123");
    }

    #[test]
    fn explicit_urls_win_over_infura() {
        let config = WalletConfig::from_lookup(lookup(&[
            ("INFURA_API_KEY", "abc123"),
            ("ETH_RPC_URL", "http://localhost:8545"),
        ]))
        .unwrap();
        assert_eq!(config.eth_rpc_url, "http://localhost:8545");
        assert_eq!(config.eth_testnet_rpc_url, "https://sepolia.infura.io/v3/abc123");
    }

    #[test]
    fn blockcypher_and_ttl_overrides() {
        let config = WalletConfig::from_lookup(lookup(&[
            ("BLOCKCYPHER_URL", "http://localhost:3000/v1"),
            ("BLOCKCYPHER_TOKEN", "tok"),
            ("FEE_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.blockcypher_url, "http://localhost:3000/v1");
        assert_eq!(config.blockcypher_token.as_deref(), Some("tok"));
        assert_eq!(config.fee_cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn bad_ttl_is_config_error() {
        let err = WalletConfig::from_lookup(lookup(&[("FEE_CACHE_TTL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, HandlerError::Config(_)));
    }

    #[test]
    fn http_timeout_override() {
        let config = WalletConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(5));

        for bad in ["0", "-1", "fast"] {
            let err = WalletConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", bad)])).unwrap_err();
            assert!(matches!(err, HandlerError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn loads_tokens_file() {
        let path = std::env::temp_dir().join(format!("coin-tokens-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"name":"dai","code":"DAI","icon":"dai","longname":"Dai",
                "contract":"0x6B175474E89094C44Da98b954EedeAC495271d0F","decimals":18}]"#,
        )
        .unwrap();

        let config = WalletConfig {
            tokens_file: Some(path.clone()),
            ..WalletConfig::default()
        };
        let tokens = config.load_tokens().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].code, "DAI");
        assert!(!tokens[0].testnet);
    }

    #[test]
    fn missing_tokens_file_is_config_error() {
        let config = WalletConfig {
            tokens_file: Some(PathBuf::from("/nonexistent/tokens.json")),
            ..WalletConfig::default()
        };
        assert!(matches!(config.load_tokens(), Err(HandlerError::Config(_))));
    }
}
