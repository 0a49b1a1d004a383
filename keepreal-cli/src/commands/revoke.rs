//! Revoke command - close a reality proof account.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use keepreal_core::Config;

use crate::utils;

pub async fn execute(record: String, keypair: PathBuf) -> Result<()> {
    let config = Config::from_env();
    let minter = utils::build_minter(&config)?;
    let signer = utils::load_keypair(&keypair)?;

    println!("{}", format!("🗑  Revoking record {record}...").dimmed());

    minter.revoke(&signer, &record).await?;

    println!();
    println!("{}", "✅ Record closed; rent refunded to the owner.".green().bold());

    Ok(())
}
