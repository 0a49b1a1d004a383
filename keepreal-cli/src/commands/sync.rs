//! Sync command - reconcile the local gallery with ledger records.

use anyhow::{Context, Result};
use colored::Colorize;
use keepreal_core::Config;
use solana_sdk::pubkey::Pubkey;

use crate::utils;

pub async fn execute(owner: String) -> Result<()> {
    let owner_key: Pubkey = owner
        .parse()
        .with_context(|| format!("Invalid owner public key: {owner}"))?;

    let config = Config::from_env();
    let minter = utils::build_minter(&config)?;

    println!("{}", "🔄 Syncing memories...".dimmed());

    let before = minter.gallery(&owner)?.len();
    let merged = minter.sync(&owner_key).await?;
    let added = merged.len().saturating_sub(before);

    println!();
    println!("{}", "✅ Gallery reconciled with the ledger.".green().bold());
    println!();
    println!("   {} {}", "New from ledger:".dimmed(), added);
    println!("   {} {}", "Total memories:".dimmed(), merged.len());
    println!(
        "   {} {}",
        "Confirmed:".dimmed(),
        merged.iter().filter(|r| r.is_confirmed()).count()
    );

    Ok(())
}
