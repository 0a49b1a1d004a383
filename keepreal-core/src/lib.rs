//! Keep It Real core - capture-to-proof pipeline library
//!
//! Turns a raw camera frame into a reality-verified record: a content hash,
//! a pinned content-addressed upload, a signed on-chain `RealityProof`, and
//! a durable local cache entry. On identity connect the local gallery is
//! reconciled with ledger state.
//!
//! # Features
//!
//! - SHA-256 content binding and deterministic record addresses
//! - Freshness/liveness policy checked before every mint attempt
//! - Pinata pinning client with a flagged development mock
//! - Wallet capability trait decoupled from any wallet SDK
//! - Optimistic local records reconciled against the ledger
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use solana_sdk::signature::Keypair;
//! use keepreal_core::{
//!     Config, GalleryCache, CaptureContext, MintRequest, Minter,
//!     RealityPolicy, RpcLedger,
//! };
//!
//! # async fn example() -> keepreal_core::Result<()> {
//! let config = Config::from_env();
//! let minter = Minter::new(
//!     RealityPolicy::default(),
//!     keepreal_core::ipfs::from_config(&config)?,
//!     Arc::new(RpcLedger::new(config.rpc_url.clone())),
//!     GalleryCache::new(config.data_dir.clone()),
//! );
//!
//! let signer = Keypair::new();
//! let outcome = minter
//!     .mint(&signer, MintRequest {
//!         image: std::fs::read("capture.jpg")?,
//!         caption: "golden hour".to_string(),
//!         capture: CaptureContext {
//!             captured_at: Utc::now(),
//!             camera_present: true,
//!             mobile_device: true,
//!         },
//!         include_timestamp: true,
//!         location: None,
//!     })
//!     .await?;
//! println!("minted record {}", outcome.record.id);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod hasher;
#[cfg(feature = "network")]
pub mod ipfs;
pub mod ledger;
#[cfg(feature = "network")]
pub mod pipeline;
pub mod policy;
pub mod reconcile;
pub mod record;

// Re-export main types for convenience
pub use cache::GalleryCache;
pub use config::Config;
pub use error::{KeepRealError, Result};
pub use hasher::content_hash;
pub use ledger::program::{
    derive_record_address, MintMemoryArgs, RealityProofAccount, DAO_TREASURY, PROGRAM_ID,
};
pub use ledger::{OwnedProof, SubmitReceipt, WalletSigner};
pub use policy::{CaptureContext, RealityPolicy, MAX_CAPTURE_AGE_SECS};
pub use record::{ConfirmationState, LocationData, Record, MAX_CAPTION_LEN};

// Network-dependent exports
#[cfg(feature = "network")]
pub use ipfs::{ContentStore, MemoryMetadata, MockStore, PinataStore};
#[cfg(feature = "network")]
pub use ledger::{Ledger, RpcLedger};
#[cfg(feature = "network")]
pub use pipeline::{MintOutcome, MintRequest, Minter};
