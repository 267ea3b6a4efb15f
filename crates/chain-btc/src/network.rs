use bitcoin::Network;

/// Default BlockCypher API root shared by every supported UTXO network.
pub const BLOCKCYPHER_API: &str = "https://api.blockcypher.com/v1";

/// Supported Bitcoin-family networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtxoNetwork {
    Bitcoin,
    BitcoinTestnet,
    Litecoin,
    Dogecoin,
}

/// Static chain parameters for a [`UtxoNetwork`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkParams {
    /// Base58 version byte for P2PKH addresses.
    pub p2pkh_prefix: u8,
    /// Base58 version byte for P2SH addresses.
    pub p2sh_prefix: u8,
    /// Version byte for WIF-encoded private keys.
    pub wif_prefix: u8,
    /// Human-readable part for segwit addresses, if the chain has segwit.
    pub bech32_hrp: Option<&'static str>,
    /// Outputs at or below this value (in base units) are not created.
    pub dust_threshold: u64,
    /// Average block interval in minutes.
    pub block_minutes: f64,
    /// `{coin}/{chain}` path segment on the BlockCypher API.
    pub api_path: &'static str,
}

const BITCOIN: NetworkParams = NetworkParams {
    p2pkh_prefix: 0x00,
    p2sh_prefix: 0x05,
    wif_prefix: 0x80,
    bech32_hrp: Some("bc"),
    dust_threshold: 546,
    block_minutes: 10.0,
    api_path: "btc/main",
};

const BITCOIN_TESTNET: NetworkParams = NetworkParams {
    p2pkh_prefix: 0x6f,
    p2sh_prefix: 0xc4,
    wif_prefix: 0xef,
    bech32_hrp: Some("tb"),
    dust_threshold: 546,
    block_minutes: 10.0,
    api_path: "btc/test3",
};

const LITECOIN: NetworkParams = NetworkParams {
    p2pkh_prefix: 0x30,
    p2sh_prefix: 0x32,
    wif_prefix: 0xb0,
    bech32_hrp: Some("ltc"),
    dust_threshold: 5_460,
    block_minutes: 2.5,
    api_path: "ltc/main",
};

// Dogecoin Core treats anything below 0.01 DOGE as dust.
const DOGECOIN: NetworkParams = NetworkParams {
    p2pkh_prefix: 0x1e,
    p2sh_prefix: 0x16,
    wif_prefix: 0x9e,
    bech32_hrp: None,
    dust_threshold: 1_000_000,
    block_minutes: 1.0,
    api_path: "doge/main",
};

impl UtxoNetwork {
    pub fn params(self) -> &'static NetworkParams {
        match self {
            UtxoNetwork::Bitcoin => &BITCOIN,
            UtxoNetwork::BitcoinTestnet => &BITCOIN_TESTNET,
            UtxoNetwork::Litecoin => &LITECOIN,
            UtxoNetwork::Dogecoin => &DOGECOIN,
        }
    }

    /// The `bitcoin` crate's `Network`, for the networks it knows about.
    pub fn to_bitcoin_network(self) -> Option<Network> {
        match self {
            UtxoNetwork::Bitcoin => Some(Network::Bitcoin),
            UtxoNetwork::BitcoinTestnet => Some(Network::Testnet),
            UtxoNetwork::Litecoin | UtxoNetwork::Dogecoin => None,
        }
    }

    pub fn is_testnet(self) -> bool {
        matches!(self, UtxoNetwork::BitcoinTestnet)
    }
}

impl std::fmt::Display for UtxoNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtxoNetwork::Bitcoin => write!(f, "bitcoin"),
            UtxoNetwork::BitcoinTestnet => write!(f, "bitcoin-testnet"),
            UtxoNetwork::Litecoin => write!(f, "litecoin"),
            UtxoNetwork::Dogecoin => write!(f, "dogecoin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitcoin_networks_map_to_bitcoin_crate() {
        assert_eq!(UtxoNetwork::Bitcoin.to_bitcoin_network(), Some(Network::Bitcoin));
        assert_eq!(
            UtxoNetwork::BitcoinTestnet.to_bitcoin_network(),
            Some(Network::Testnet)
        );
    }

    #[test]
    fn altcoins_have_no_bitcoin_network() {
        assert!(UtxoNetwork::Litecoin.to_bitcoin_network().is_none());
        assert!(UtxoNetwork::Dogecoin.to_bitcoin_network().is_none());
    }

    #[test]
    fn version_bytes_are_distinct_per_network() {
        let all = [
            UtxoNetwork::Bitcoin,
            UtxoNetwork::BitcoinTestnet,
            UtxoNetwork::Litecoin,
            UtxoNetwork::Dogecoin,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.params().p2pkh_prefix, b.params().p2pkh_prefix);
                assert_ne!(a.params().wif_prefix, b.params().wif_prefix);
            }
        }
    }

    #[test]
    fn dogecoin_has_no_segwit() {
        assert!(UtxoNetwork::Dogecoin.params().bech32_hrp.is_none());
        assert_eq!(UtxoNetwork::Litecoin.params().bech32_hrp, Some("ltc"));
    }

    #[test]
    fn only_bitcoin_testnet_is_testnet() {
        assert!(UtxoNetwork::BitcoinTestnet.is_testnet());
        assert!(!UtxoNetwork::Bitcoin.is_testnet());
        assert!(!UtxoNetwork::Dogecoin.is_testnet());
    }

    #[test]
    fn display_names() {
        assert_eq!(UtxoNetwork::Bitcoin.to_string(), "bitcoin");
        assert_eq!(UtxoNetwork::BitcoinTestnet.to_string(), "bitcoin-testnet");
        assert_eq!(UtxoNetwork::Litecoin.to_string(), "litecoin");
        assert_eq!(UtxoNetwork::Dogecoin.to_string(), "dogecoin");
    }
}
