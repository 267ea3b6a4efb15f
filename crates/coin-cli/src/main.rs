//! Coin wallet CLI
//!
//! Drives the coin handlers from the command line: keys, addresses,
//! balances, fee options and payments for every configured coin.

mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coin_handlers::{CoinRegistry, TracingNotifier, WalletConfig};
use secrecy::SecretString;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Coin wallet CLI - keys, balances and payments across coins.
#[derive(Parser, Debug)]
#[command(name = "coin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List operable coins and listing-only entries.
    List,

    /// Generate a fresh 24-word BIP-39 mnemonic.
    NewMnemonic,

    /// Create a private key, from a mnemonic when one is given.
    NewKey {
        /// Coin code or name (e.g. BTC, eth.tst, dogecoin).
        #[arg(short, long)]
        coin: String,

        /// BIP-39 mnemonic phrase.
        #[arg(short, long, env = "COIN_MNEMONIC", hide_env_values = true)]
        mnemonic: Option<String>,

        /// BIP-39 passphrase.
        #[arg(long, env = "COIN_PASSPHRASE", hide_env_values = true, default_value = "")]
        passphrase: String,
    },

    /// Print the receive address for a private key.
    Address {
        #[arg(short, long)]
        coin: String,

        /// Private key in the coin's native format.
        #[arg(short, long, env = "COIN_PRIVATE_KEY", hide_env_values = true)]
        key: String,
    },

    /// Check whether an address is valid for a coin.
    Validate {
        #[arg(short, long)]
        coin: String,

        #[arg(short, long)]
        address: String,
    },

    /// Show the confirmed and pending balance of an address.
    Balance {
        #[arg(short, long)]
        coin: String,

        #[arg(short, long)]
        address: String,
    },

    /// Show the current fee options, cheapest first.
    Fees {
        #[arg(short, long)]
        coin: String,
    },

    /// Send a payment.
    Send {
        #[arg(short, long)]
        coin: String,

        /// Sender private key in the coin's native format.
        #[arg(short, long, env = "COIN_PRIVATE_KEY", hide_env_values = true)]
        key: String,

        /// Destination address.
        #[arg(short, long)]
        to: String,

        /// Amount in display units (e.g. 0.015).
        #[arg(short, long)]
        amount: String,

        /// Index into the fee options shown by `fees`.
        #[arg(short, long, default_value = "1")]
        fee: usize,
    },

    /// Print an explorer link for an address or a transaction.
    Link {
        #[arg(short, long)]
        coin: String,

        #[arg(short, long, conflicts_with = "tx", required_unless_present = "tx")]
        address: Option<String>,

        #[arg(short, long)]
        tx: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    let config = WalletConfig::from_env().context("reading wallet configuration")?;
    let registry = CoinRegistry::from_config(&config, Arc::new(TracingNotifier))
        .context("building coin registry")?;

    match cli.command {
        Commands::List => commands::list(&registry),
        Commands::NewMnemonic => commands::new_mnemonic(),
        Commands::NewKey {
            coin,
            mnemonic,
            passphrase,
        } => commands::new_key(&registry, &coin, mnemonic.as_deref(), &passphrase),
        Commands::Address { coin, key } => {
            commands::address(&registry, &coin, &SecretString::from(key))
        }
        Commands::Validate { coin, address } => commands::validate(&registry, &coin, &address),
        Commands::Balance { coin, address } => {
            commands::balance(&registry, &coin, &address).await
        }
        Commands::Fees { coin } => commands::fees(&registry, &coin).await,
        Commands::Send {
            coin,
            key,
            to,
            amount,
            fee,
        } => commands::send(&registry, &coin, &SecretString::from(key), &to, &amount, fee).await,
        Commands::Link { coin, address, tx } => {
            commands::link(&registry, &coin, address.as_deref(), tx.as_deref())
        }
    }
}
