//! Offline commands: catalog, keys, addresses, explorer links.

use anyhow::{Context, Result};
use coin_handlers::keys::{generate_mnemonic, MasterSeed};
use coin_handlers::CoinRegistry;
use secrecy::{ExposeSecret, SecretString};

/// List every coin in the registry.
pub fn list(registry: &CoinRegistry) -> Result<()> {
    println!("Coins");
    println!("=====");
    for handler in registry.iter() {
        let d = handler.descriptor();
        let testnet = if d.test_coin { "  (testnet)" } else { "" };
        println!("  {:<10} {:<16} {}{}", d.code, d.name, d.longname, testnet);
    }

    if !registry.listings().is_empty() {
        println!();
        println!("Listed only");
        println!("===========");
        for listing in registry.listings() {
            println!("  {:<10} {:<16} {}", listing.code, listing.name, listing.longname);
        }
    }

    println!();
    println!("Total: {} operable coin(s)", registry.len());
    Ok(())
}

pub fn new_mnemonic() -> Result<()> {
    println!("{}", generate_mnemonic()?);
    Ok(())
}

/// Create a key from a mnemonic, or a fresh random one.
pub fn new_key(
    registry: &CoinRegistry,
    coin: &str,
    mnemonic: Option<&str>,
    passphrase: &str,
) -> Result<()> {
    let handler = registry.require(coin)?;
    let code = &handler.descriptor().code;

    let key = match mnemonic {
        Some(phrase) => {
            let seed = MasterSeed::from_mnemonic(phrase, passphrase)?;
            println!("Derived {} key at {}", code, handler.descriptor().derivation_path);
            handler.new_private_key(&seed)?
        }
        None => {
            println!("No mnemonic given, creating a random {code} key.");
            handler.new_random_private_key()?
        }
    };
    let address = handler.address_from_private_key(&key)?;

    println!();
    println!("  Private key:  {}", key.expose_secret());
    println!("  Address:      {address}");
    Ok(())
}

pub fn address(registry: &CoinRegistry, coin: &str, key: &SecretString) -> Result<()> {
    let handler = registry.require(coin)?;
    let address = handler
        .address_from_private_key(key)
        .with_context(|| format!("not a {} private key", handler.descriptor().code))?;
    println!("{address}");
    Ok(())
}

pub fn validate(registry: &CoinRegistry, coin: &str, address: &str) -> Result<()> {
    let handler = registry.require(coin)?;
    let code = &handler.descriptor().code;
    if !handler.validate_address(address) {
        anyhow::bail!("{address} is not a valid {code} address");
    }
    println!("{address} is a valid {code} address");
    if let Some(seed) = handler.identicon_seed(address) {
        println!("  Identicon seed: {seed}");
    }
    Ok(())
}

pub fn link(
    registry: &CoinRegistry,
    coin: &str,
    address: Option<&str>,
    tx: Option<&str>,
) -> Result<()> {
    let handler = registry.require(coin)?;
    let url = match (address, tx) {
        (Some(address), _) => handler.explorer_link_address(address),
        (None, Some(tx)) => handler.explorer_link_tx(tx),
        (None, None) => anyhow::bail!("pass --address or --tx"),
    };
    println!("{url}");
    Ok(())
}
