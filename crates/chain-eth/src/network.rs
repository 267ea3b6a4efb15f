use serde::Serialize;

/// Definition of an EVM network the handlers can operate on.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    /// Public endpoint used when no RPC URL is configured.
    pub rpc_url: &'static str,
    pub is_testnet: bool,
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    is_testnet: true,
};

/// Network selector handed to the EVM handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvmNetwork {
    Mainnet,
    Sepolia,
}

impl EvmNetwork {
    pub fn chain(self) -> &'static EvmChain {
        match self {
            EvmNetwork::Mainnet => &ETHEREUM,
            EvmNetwork::Sepolia => &SEPOLIA,
        }
    }

    pub fn chain_id(self) -> u64 {
        self.chain().chain_id
    }

    pub fn is_testnet(self) -> bool {
        self.chain().is_testnet
    }

    /// Infura endpoint for this network.
    pub fn infura_url(self, api_key: &str) -> String {
        match self {
            EvmNetwork::Mainnet => format!("https://mainnet.infura.io/v3/{api_key}"),
            EvmNetwork::Sepolia => format!("https://sepolia.infura.io/v3/{api_key}"),
        }
    }
}

impl std::fmt::Display for EvmNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.chain().name)
    }
}
