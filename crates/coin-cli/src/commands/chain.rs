//! Commands that reach the chain backends.

use alloy_primitives::I256;
use anyhow::{Context, Result};
use coin_handlers::units::{format_display, parse_display};
use coin_handlers::CoinRegistry;
use secrecy::SecretString;

/// Show the balance of an address.
pub async fn balance(registry: &CoinRegistry, coin: &str, address: &str) -> Result<()> {
    let handler = registry.require(coin)?;
    let d = handler.descriptor();
    if !handler.validate_address(address) {
        anyhow::bail!("{address} is not a valid {} address", d.code);
    }

    println!("Checking balance...");
    let balance = handler.get_balance(address).await?;

    println!();
    println!("{} Balance", d.longname);
    println!("==============");
    println!("  Address:      {address}");
    println!(
        "  Confirmed:    {} {}",
        format_display(balance.confirmed, d.decimals, d.display_precision),
        d.code
    );
    if balance.pending != I256::ZERO {
        let sign = if balance.pending.is_negative() { "-" } else { "+" };
        println!(
            "  Pending:      {sign}{} {}",
            format_display(balance.pending.unsigned_abs(), d.decimals, d.display_precision),
            d.code
        );
    }
    Ok(())
}

/// Show the fee options for a coin.
pub async fn fees(registry: &CoinRegistry, coin: &str) -> Result<()> {
    let handler = registry.require(coin)?;
    let options = handler.get_fees().await?;

    println!("{} Fee Options", handler.descriptor().code);
    println!("===============");
    for (index, option) in options.iter().enumerate() {
        println!(
            "  [{index}] {:<24} ~{:.1} min",
            handler.fee_display(option),
            option.est_minutes
        );
    }
    Ok(())
}

/// Sign and broadcast a payment using the fee option at `fee_index`.
pub async fn send(
    registry: &CoinRegistry,
    coin: &str,
    key: &SecretString,
    to: &str,
    amount: &str,
    fee_index: usize,
) -> Result<()> {
    let handler = registry.require(coin)?;
    let d = handler.descriptor();
    if !handler.validate_address(to) {
        anyhow::bail!("{to} is not a valid {} address", d.code);
    }
    let amount_units = parse_display(amount, d.decimals)?;

    let options = handler.get_fees().await?;
    let fee = options
        .get(fee_index)
        .with_context(|| format!("fee option {fee_index} out of range (0..{})", options.len()))?;

    println!("Sending {amount} {} to {to}", d.code);
    println!("  Fee:          {}", handler.fee_display(fee));

    let txid = handler.send_payment(key, to, amount_units, fee).await?;

    println!();
    println!("Transaction sent!");
    println!("  TXID:         {txid}");
    println!("  Explorer:     {}", handler.explorer_link_tx(&txid));
    Ok(())
}
