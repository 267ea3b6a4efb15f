//! Built-in coin descriptors.

use chain_btc::network::UtxoNetwork;
use chain_eth::network::EvmNetwork;
use chain_eth::transaction::TRANSFER_GAS_LIMIT;

use crate::descriptor::{
    CoinDescriptor, ExplorerTemplates, Link, ListingDescriptor, NetworkSelection,
    ETH_DERIVATION_PATH, EVM_DISPLAY_PRECISION, UTXO_DISPLAY_PRECISION,
};

struct UtxoCoin {
    name: &'static str,
    code: &'static str,
    icon: &'static str,
    longname: &'static str,
    description: &'static str,
    links: &'static [(&'static str, &'static str)],
    network: UtxoNetwork,
    derivation_path: &'static str,
    explorer_address: &'static str,
    explorer_tx: &'static str,
}

fn links(pairs: &[(&str, &str)]) -> Vec<Link> {
    pairs.iter().map(|(label, url)| Link::new(*label, *url)).collect()
}

fn utxo(coin: UtxoCoin) -> CoinDescriptor {
    CoinDescriptor {
        name: coin.name.to_string(),
        code: coin.code.to_string(),
        icon: coin.icon.to_string(),
        longname: coin.longname.to_string(),
        description: coin.description.to_string(),
        links: links(coin.links),
        network: NetworkSelection::Utxo(coin.network),
        test_coin: coin.network.is_testnet(),
        decimals: 8,
        display_precision: UTXO_DISPLAY_PRECISION,
        derivation_path: coin.derivation_path.to_string(),
        explorer: ExplorerTemplates {
            address: coin.explorer_address.to_string(),
            tx: coin.explorer_tx.to_string(),
        },
        fee_coin: None,
        gas_limit: None,
        contract: None,
    }
}

pub fn bitcoin() -> CoinDescriptor {
    utxo(UtxoCoin {
        name: "bitcoin",
        code: "BTC",
        icon: "btc",
        longname: "Bitcoin",
        description: "via Wikipedia: Bitcoin is a cryptocurrency and worldwide payment system. \
            It is the first decentralized digital currency, as the system works without a central bank or single administrator. \
            The network is peer-to-peer and transactions take place between users directly, without an intermediary. \
            These transactions are verified by network nodes through the use of cryptography and recorded in a public distributed ledger called a blockchain. \
            Bitcoin was invented by an unknown person or group of people under the name Satoshi Nakamoto and released as open-source software in 2009.",
        links: &[("bitcoin.org", "https://bitcoin.org/")],
        network: UtxoNetwork::Bitcoin,
        derivation_path: "m/44'/0'/0'/0/0",
        explorer_address: "https://www.blockchain.com/btc/address/{address}",
        explorer_tx: "https://www.blockchain.com/btc/tx/{tx}",
    })
}

pub fn bitcoin_test() -> CoinDescriptor {
    utxo(UtxoCoin {
        name: "bitcoin-test",
        code: "BTC.TST",
        icon: "btc.test",
        longname: "Bitcoin TestNet",
        description: "via Bitcoin Wiki: The testnet is an alternative Bitcoin block chain, to be used for testing. \
            Testnet coins are separate and distinct from actual bitcoins, and are never supposed to have any value. \
            This allows application developers or bitcoin testers to experiment, without having to use real bitcoins or worrying about breaking the main bitcoin chain.",
        links: &[
            ("Bitcoin Wiki", "https://en.bitcoin.it/wiki/Testnet"),
            ("Request TestNet coins", "https://testnet.manu.backend.hamburg/faucet"),
        ],
        network: UtxoNetwork::BitcoinTestnet,
        derivation_path: "m/44'/1'/0'/0/0",
        explorer_address: "https://testnet.blockchain.info/address/{address}",
        explorer_tx: "https://testnet.blockchain.info/tx/{tx}",
    })
}

pub fn litecoin() -> CoinDescriptor {
    utxo(UtxoCoin {
        name: "litecoin",
        code: "LTC",
        icon: "ltc",
        longname: "Litecoin",
        description: "via litecoin.org: Litecoin is a peer-to-peer Internet currency that enables instant, near-zero cost payments to anyone in the world. \
            Litecoin is an open source, global payment network that is fully decentralized without any central authorities. \
            Mathematics secures the network and empowers individuals to control their own finances. \
            Litecoin features faster transaction confirmation times and improved storage efficiency than the leading math-based currency. \
            With substantial industry support, trade volume and liquidity, Litecoin is a proven medium of commerce complementary to Bitcoin.",
        links: &[("litecoin.org", "https://litecoin.org/")],
        network: UtxoNetwork::Litecoin,
        derivation_path: "m/44'/2'/0'/0/0",
        explorer_address: "https://bchain.info/LTC/addr/{address}",
        explorer_tx: "https://bchain.info/LTC/tx/{tx}",
    })
}

pub fn dogecoin() -> CoinDescriptor {
    utxo(UtxoCoin {
        name: "dogecoin",
        code: "DOGE",
        icon: "doge",
        longname: "Dogecoin",
        description: "Dogecoin is a decentralized, peer-to-peer digital currency that enables you to easily send money online. \
            Think of it as \"the internet currency.\"",
        links: &[
            ("dogecoin.com", "https://dogecoin.com/"),
            ("CoinMarketCap", "https://coinmarketcap.com/currencies/dogecoin/"),
        ],
        network: UtxoNetwork::Dogecoin,
        derivation_path: "m/44'/3'/0'/0/0",
        explorer_address: "https://dogechain.info/address/{address}",
        explorer_tx: "https://dogechain.info/tx/{tx}",
    })
}

struct EvmCoin {
    name: &'static str,
    code: &'static str,
    icon: &'static str,
    longname: &'static str,
    description: &'static str,
    links: &'static [(&'static str, &'static str)],
    network: EvmNetwork,
    explorer_host: &'static str,
}

fn evm(coin: EvmCoin) -> CoinDescriptor {
    let host = coin.explorer_host;
    CoinDescriptor {
        name: coin.name.to_string(),
        code: coin.code.to_string(),
        icon: coin.icon.to_string(),
        longname: coin.longname.to_string(),
        description: coin.description.to_string(),
        links: links(coin.links),
        network: NetworkSelection::Evm(coin.network),
        test_coin: coin.network.is_testnet(),
        decimals: coin.network.chain().decimals,
        display_precision: EVM_DISPLAY_PRECISION,
        derivation_path: ETH_DERIVATION_PATH.to_string(),
        explorer: ExplorerTemplates {
            address: format!("{host}/address/{{address}}"),
            tx: format!("{host}/tx/{{tx}}"),
        },
        fee_coin: None,
        gas_limit: Some(TRANSFER_GAS_LIMIT),
        contract: None,
    }
}

pub fn ethereum() -> CoinDescriptor {
    evm(EvmCoin {
        name: "ethereum",
        code: "ETH",
        icon: "eth",
        longname: "Ethereum",
        description: "via Wikipedia: Ethereum is an open-source, public, blockchain-based distributed computing platform and operating system featuring smart contract (scripting) functionality. \
            Along with Bitcoin, Ethereum is considered to be one of the pioneer platforms in distributed ledger and blockchain technology.",
        links: &[
            ("ethereum.org", "https://ethereum.org/"),
            ("Wikipedia", "https://en.wikipedia.org/wiki/Ethereum"),
        ],
        network: EvmNetwork::Mainnet,
        explorer_host: "https://etherscan.io",
    })
}

pub fn ethereum_test() -> CoinDescriptor {
    evm(EvmCoin {
        name: "ethereum-test",
        code: "ETH.TST",
        icon: "eth.test",
        longname: "Ethereum Testnet",
        description: "Sepolia is an ethereum testing network.",
        links: &[("Request Test Eth", "https://sepoliafaucet.com/")],
        network: EvmNetwork::Sepolia,
        explorer_host: "https://sepolia.etherscan.io",
    })
}

pub fn bitcoin_cash() -> ListingDescriptor {
    ListingDescriptor {
        name: "bitcoin-cash".to_string(),
        code: "BCH".to_string(),
        icon: "bch".to_string(),
        longname: "Bitcoin Cash".to_string(),
        description: "via bitcoin.com: Bitcoin Cash (BCH) is a peer-to-peer electronic cash system. \
            It is a consensus network that enables a new type of payment method and a completely digital form of money. \
            It is a decentralized peer-to-peer payment network that is powered by its users with no central authority or middlemen."
            .to_string(),
        links: links(&[
            ("CoinMarketCap", "https://coinmarketcap.com/currencies/bitcoin-cash/"),
            ("bitcoin.com", "https://bitcoin.com/"),
        ]),
    }
}

/// Every built-in operable coin, in display order.
pub fn builtins() -> Vec<CoinDescriptor> {
    vec![
        bitcoin(),
        bitcoin_test(),
        litecoin(),
        dogecoin(),
        ethereum(),
        ethereum_test(),
    ]
}

pub fn listings() -> Vec<ListingDescriptor> {
    vec![bitcoin_cash()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_codes_are_unique() {
        let all = builtins();
        let names: HashSet<_> = all.iter().map(|d| d.name.as_str()).collect();
        let codes: HashSet<_> = all.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(names.len(), all.len());
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_coins_are_flagged() {
        for descriptor in builtins() {
            assert_eq!(descriptor.test_coin, descriptor.code.ends_with(".TST"), "{}", descriptor.code);
        }
    }

    #[test]
    fn derivation_paths() {
        assert_eq!(bitcoin().derivation_path, "m/44'/0'/0'/0/0");
        assert_eq!(bitcoin_test().derivation_path, "m/44'/1'/0'/0/0");
        assert_eq!(litecoin().derivation_path, "m/44'/2'/0'/0/0");
        assert_eq!(dogecoin().derivation_path, "m/44'/3'/0'/0/0");
        assert_eq!(ethereum().derivation_path, "m/44'/60'/0'/0/0");
        assert_eq!(ethereum_test().derivation_path, ethereum().derivation_path);
    }

    #[test]
    fn explorer_links() {
        assert_eq!(
            litecoin().explorer_link_address("LaMT348PWRnrqeeWArpwQPbuanpXDZGEUz"),
            "https://bchain.info/LTC/addr/LaMT348PWRnrqeeWArpwQPbuanpXDZGEUz"
        );
        assert_eq!(
            dogecoin().explorer_link_tx("abcd"),
            "https://dogechain.info/tx/abcd"
        );
        assert_eq!(
            ethereum_test().explorer_link_address("0x1"),
            "https://sepolia.etherscan.io/address/0x1"
        );
        assert_eq!(ethereum().explorer_link_tx("0xff"), "https://etherscan.io/tx/0xff");
    }

    #[test]
    fn units_and_gas() {
        assert_eq!(bitcoin().decimals, 8);
        assert_eq!(bitcoin().gas_limit, None);
        assert_eq!(ethereum().decimals, 18);
        assert_eq!(ethereum().gas_limit, Some(21_000));
        assert_eq!(ethereum().display_precision, 10);
    }

    #[test]
    fn links_keep_their_order() {
        let labels: Vec<_> = dogecoin().links.into_iter().map(|l| l.label).collect();
        assert_eq!(labels, ["dogecoin.com", "CoinMarketCap"]);
    }

    #[test]
    fn bitcoin_cash_is_listing_only() {
        let listing = bitcoin_cash();
        assert_eq!(listing.code, "BCH");
        assert!(builtins().iter().all(|d| d.code != "BCH"));
    }
}
