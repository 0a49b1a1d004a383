//! Keep It Real CLI - reality-verified photo proofs on Solana.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "keepreal")]
#[command(author, version, about = "Mint reality-verified photo proofs on Solana", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a captured photo as a reality proof on the ledger
    Mint {
        /// Path to the captured image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Caption embedded in the pinned metadata (max 100 characters)
        #[arg(short, long, default_value = "")]
        caption: String,

        /// Capture time as RFC 3339 (defaults to now)
        #[arg(long)]
        captured_at: Option<String>,

        /// Do not embed the capture time in the record
        #[arg(long)]
        no_timestamp: bool,

        /// Capture coordinates as LAT,LON
        #[arg(long)]
        location: Option<String>,

        /// Path to the owner keypair (JSON); a devnet burner is generated
        /// and funded when omitted
        #[arg(short, long)]
        keypair: Option<PathBuf>,

        /// Declare a non-mobile capture context (the strict policy rejects
        /// it in release builds)
        #[arg(long)]
        desktop: bool,
    },

    /// Print the locally cached gallery for an owner
    Gallery {
        /// Owner public key (base58)
        #[arg(value_name = "OWNER")]
        owner: String,
    },

    /// Reconcile the local gallery with ledger records for an owner
    Sync {
        /// Owner public key (base58)
        #[arg(value_name = "OWNER")]
        owner: String,
    },

    /// Close a reality proof account and drop it from the gallery
    Revoke {
        /// Record address (base58)
        #[arg(value_name = "RECORD")]
        record: String,

        /// Path to the owner keypair (JSON)
        #[arg(short, long)]
        keypair: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mint {
            file,
            caption,
            captured_at,
            no_timestamp,
            location,
            keypair,
            desktop,
        } => {
            commands::mint::execute(
                file,
                caption,
                captured_at,
                no_timestamp,
                location,
                keypair,
                desktop,
            )
            .await
        }
        Commands::Gallery { owner } => commands::gallery::execute(owner),
        Commands::Sync { owner } => commands::sync::execute(owner).await,
        Commands::Revoke { record, keypair } => commands::revoke::execute(record, keypair).await,
    }
}
