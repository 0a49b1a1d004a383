//! Mint command - run the capture-to-proof pipeline for one photo.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use colored::Colorize;
use keepreal_core::{CaptureContext, Config, ConfirmationState, MintRequest, RpcLedger};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::info;

use crate::utils;

/// Airdrop amount for burner keypairs, in SOL.
const AIRDROP_SOL: u64 = 1;

/// Maximum retries for the devnet airdrop. Funding happens before the
/// pipeline starts; the pipeline itself never retries.
const AIRDROP_RETRIES: u32 = 3;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    file: PathBuf,
    caption: String,
    captured_at: Option<String>,
    no_timestamp: bool,
    location: Option<String>,
    keypair: Option<PathBuf>,
    desktop: bool,
) -> Result<()> {
    let config = Config::from_env();
    let minter = utils::build_minter(&config)?;

    let image = std::fs::read(&file)
        .with_context(|| format!("Failed to read image file: {}", file.display()))?;
    info!(path = %file.display(), bytes = image.len(), "Read capture");

    let captured_at = match captured_at {
        Some(value) => utils::parse_captured_at(&value)?,
        None => Utc::now(),
    };

    let location = location.as_deref().map(utils::parse_location).transpose()?;

    // Resolve the signing identity: a provided keypair, or a funded burner.
    let ledger = RpcLedger::new(config.rpc_url.clone());
    let signer = match keypair {
        Some(path) => utils::load_keypair(&path)?,
        None => {
            println!("{}", "🔑 Generating burner keypair...".dimmed());
            let burner = Keypair::new();
            println!("{}", format!("   Pubkey: {}", burner.pubkey()).dimmed());
            fund_burner(&ledger, &burner.pubkey()).await?;
            burner
        }
    };

    let request = MintRequest {
        image,
        caption,
        capture: CaptureContext {
            captured_at,
            // The image came off a capture device; the CLI has no way to
            // probe it, so hardware presence is declared, not detected.
            camera_present: true,
            mobile_device: !desktop,
        },
        include_timestamp: !no_timestamp,
        location,
    };

    println!("{}", "📸 Hashing pixels into truth...".dimmed());
    println!("{}", "📌 Securing memory on chain...".dimmed());

    let outcome = minter.mint(&signer, request).await?;
    let record = &outcome.record;

    println!();
    match (&outcome.signature, record.state) {
        (Some(signature), _) => {
            let explorer_url =
                format!("https://explorer.solana.com/tx/{signature}?cluster=devnet");
            println!("{}", "✅ Authenticity verified. Memory locked forever.".green().bold());
            println!();
            println!("   {} {}", "Record:".dimmed(), record.id);
            println!("   {} {}", "Content hash:".dimmed(), &hex::encode(record.content_hash)[..16]);
            println!("   {} {}", "Image CID:".dimmed(), record.content_id);
            if let Some(cid) = &record.metadata_content_id {
                println!("   {} {}", "Metadata CID:".dimmed(), cid);
            }
            println!("   {} {}", "Transaction:".dimmed(), signature);
            println!("   {} {}", "Explorer:".dimmed(), explorer_url.cyan());
        }
        (None, ConfirmationState::Unconfirmed) => {
            println!("{}", "⚠️  Ledger submission failed.".yellow().bold());
            println!(
                "   {}",
                "The memory is kept locally (unconfirmed). Re-run mint to retry.".dimmed()
            );
            println!();
            println!("   {} {}", "Record:".dimmed(), record.id);
            println!("   {} {}", "Image CID:".dimmed(), record.content_id);
        }
        (None, state) => bail!("Unexpected record state after mint: {state:?}"),
    }

    Ok(())
}

/// Request a devnet airdrop with bounded retries, then wait for the
/// balance to land.
async fn fund_burner(ledger: &RpcLedger, pubkey: &Pubkey) -> Result<()> {
    let lamports = AIRDROP_SOL * LAMPORTS_PER_SOL;

    println!(
        "{}",
        format!("💰 Requesting {AIRDROP_SOL} SOL airdrop...").dimmed()
    );

    for attempt in 1..=AIRDROP_RETRIES {
        match ledger.rpc().request_airdrop(pubkey, lamports).await {
            Ok(signature) => {
                println!(
                    "{}",
                    format!("   Airdrop requested (attempt {attempt}): {signature}").dimmed()
                );
                break;
            }
            Err(e) => {
                if attempt == AIRDROP_RETRIES {
                    bail!("Airdrop failed after {AIRDROP_RETRIES} attempts: {e}");
                }
                println!(
                    "{}",
                    format!("   Airdrop attempt {attempt} failed, retrying...").yellow()
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }

    println!("{}", "⏳ Waiting for airdrop confirmation...".dimmed());
    for _ in 0..30 {
        match ledger.rpc().get_balance(pubkey).await {
            Ok(balance) if balance >= lamports => {
                println!(
                    "{}",
                    format!("   Balance: {} SOL", balance as f64 / LAMPORTS_PER_SOL as f64)
                        .dimmed()
                );
                return Ok(());
            }
            _ => tokio::time::sleep(Duration::from_millis(500)).await,
        }
    }

    bail!("Timeout waiting for airdrop to confirm")
}
