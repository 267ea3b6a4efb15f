//! Static metadata describing each coin.

use chain_btc::network::UtxoNetwork;
use chain_eth::erc20::DEFAULT_TRANSFER_GAS_LIMIT;
use chain_eth::network::EvmNetwork;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::units::MAX_DECIMALS;

/// BIP-44 path shared by every Ethereum-family coin.
pub const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Display precision for UTXO coins.
pub const UTXO_DISPLAY_PRECISION: u8 = 8;
/// Display precision for EVM coins and tokens.
pub const EVM_DISPLAY_PRECISION: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Network constant handed to the chain library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSelection {
    Utxo(UtxoNetwork),
    Evm(EvmNetwork),
}

/// Explorer URL templates. Placeholders: `{address}`, `{tx}`, `{contract}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerTemplates {
    pub address: String,
    pub tx: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCoin {
    pub code: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    Erc20,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub address: String,
    pub standard: TokenStandard,
}

/// Identity, display metadata and chain parameters of one operable coin.
#[derive(Debug, Clone)]
pub struct CoinDescriptor {
    pub name: String,
    pub code: String,
    pub icon: String,
    pub longname: String,
    pub description: String,
    pub links: Vec<Link>,
    pub network: NetworkSelection,
    pub test_coin: bool,
    pub decimals: u8,
    pub display_precision: u8,
    pub derivation_path: String,
    pub explorer: ExplorerTemplates,
    pub fee_coin: Option<FeeCoin>,
    pub gas_limit: Option<u64>,
    pub contract: Option<ContractInfo>,
}

impl CoinDescriptor {
    pub fn explorer_link_address(&self, address: &str) -> String {
        self.render(&self.explorer.address, address, "")
    }

    pub fn explorer_link_tx(&self, txid: &str) -> String {
        self.render(&self.explorer.tx, "", txid)
    }

    fn render(&self, template: &str, address: &str, txid: &str) -> String {
        let contract = self.contract.as_ref().map(|c| c.address.as_str()).unwrap_or("");
        template
            .replace("{address}", address)
            .replace("{tx}", txid)
            .replace("{contract}", contract)
    }

    /// Code and decimals of the coin that pays network fees.
    pub fn fee_unit(&self) -> (&str, u8) {
        match &self.fee_coin {
            Some(fee) => (fee.code.as_str(), fee.decimals),
            None => (self.code.as_str(), self.decimals),
        }
    }
}

/// A coin shown in the catalog without chain operations.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDescriptor {
    pub name: String,
    pub code: String,
    pub icon: String,
    pub longname: String,
    pub description: String,
    pub links: Vec<Link>,
}

/// An ERC-20 token definition as loaded from the tokens file.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub code: String,
    pub icon: String,
    pub longname: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub contract: String,
    pub decimals: u8,
    #[serde(default)]
    pub testnet: bool,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

impl TokenSpec {
    /// Builds the token's descriptor. Decimals above [`MAX_DECIMALS`] are
    /// rejected since their unit does not fit in a `U256`.
    pub fn into_descriptor(self) -> Result<CoinDescriptor, HandlerError> {
        if self.decimals > MAX_DECIMALS {
            return Err(HandlerError::Config(format!(
                "{} has {} decimals, the maximum is {MAX_DECIMALS}",
                self.code, self.decimals
            )));
        }

        let (network, fee_code, explorer_host) = if self.testnet {
            (EvmNetwork::Sepolia, "ETH.TST", "https://sepolia.etherscan.io")
        } else {
            (EvmNetwork::Mainnet, "ETH", "https://etherscan.io")
        };

        Ok(CoinDescriptor {
            name: self.name,
            code: self.code,
            icon: self.icon,
            longname: self.longname,
            description: self.description,
            links: self.links,
            network: NetworkSelection::Evm(network),
            test_coin: self.testnet,
            decimals: self.decimals,
            display_precision: EVM_DISPLAY_PRECISION,
            derivation_path: ETH_DERIVATION_PATH.to_string(),
            explorer: ExplorerTemplates {
                address: format!("{explorer_host}/token/{{contract}}?a={{address}}"),
                tx: format!("{explorer_host}/tx/{{tx}}"),
            },
            fee_coin: Some(FeeCoin {
                code: fee_code.to_string(),
                decimals: 18,
            }),
            gas_limit: Some(self.gas_limit.unwrap_or(DEFAULT_TRANSFER_GAS_LIMIT)),
            contract: Some(ContractInfo {
                address: self.contract,
                standard: TokenStandard::Erc20,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_JSON: &str = r#"{
        "name": "usd-coin",
        "code": "USDC",
        "icon": "usdc",
        "longname": "USD Coin",
        "description": "Fiat-backed stablecoin",
        "links": [
            {"label": "Centre", "url": "https://www.centre.io"},
            {"label": "Etherscan", "url": "https://etherscan.io/token/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"}
        ],
        "contract": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        "decimals": 6
    }"#;

    #[test]
    fn token_spec_builds_mainnet_descriptor() {
        let spec: TokenSpec = serde_json::from_str(USDC_JSON).unwrap();
        let descriptor = spec.into_descriptor().unwrap();

        assert_eq!(descriptor.network, NetworkSelection::Evm(EvmNetwork::Mainnet));
        assert_eq!(descriptor.decimals, 6);
        assert_eq!(descriptor.gas_limit, Some(200_000));
        assert_eq!(descriptor.fee_unit(), ("ETH", 18));
        assert_eq!(descriptor.derivation_path, "m/44'/60'/0'/0/0");
        assert_eq!(descriptor.links[0].label, "Centre");
        assert_eq!(descriptor.links[1].label, "Etherscan");
        assert!(!descriptor.test_coin);
    }

    #[test]
    fn token_links_render_contract() {
        let descriptor = serde_json::from_str::<TokenSpec>(USDC_JSON)
            .unwrap()
            .into_descriptor()
            .unwrap();

        assert_eq!(
            descriptor.explorer_link_address("0xabc"),
            "https://etherscan.io/token/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48?a=0xabc"
        );
        assert_eq!(
            descriptor.explorer_link_tx("0xfeed"),
            "https://etherscan.io/tx/0xfeed"
        );
    }

    #[test]
    fn testnet_token_pays_fees_in_test_ether() {
        let mut spec: TokenSpec = serde_json::from_str(USDC_JSON).unwrap();
        spec.testnet = true;
        spec.gas_limit = Some(90_000);
        let descriptor = spec.into_descriptor().unwrap();

        assert_eq!(descriptor.network, NetworkSelection::Evm(EvmNetwork::Sepolia));
        assert_eq!(descriptor.fee_unit(), ("ETH.TST", 18));
        assert_eq!(descriptor.gas_limit, Some(90_000));
        assert!(descriptor
            .explorer_link_tx("0x1")
            .starts_with("https://sepolia.etherscan.io/tx/"));
    }

    #[test]
    fn token_decimals_are_bounded() {
        let mut spec: TokenSpec = serde_json::from_str(USDC_JSON).unwrap();
        spec.decimals = 78;
        assert!(matches!(spec.clone().into_descriptor(), Err(HandlerError::Config(_))));

        spec.decimals = 77;
        assert_eq!(spec.into_descriptor().unwrap().decimals, 77);
    }

    #[test]
    fn fee_unit_defaults_to_own_code() {
        let descriptor = crate::catalog::bitcoin();
        assert_eq!(descriptor.fee_unit(), ("BTC", 8));
    }
}
