//! Content-addressed pinning clients.
//!
//! Uploads go to a pinning service (Pinata); every upload returns a content
//! identifier. Two implementations:
//!
//! - **Pinata** — the real HTTP client (requires a bearer credential)
//! - **Mock** — deterministic identifiers for credential-less development
//!
//! The mock is an explicit, loudly-flagged escape hatch: the env-driven
//! factory only selects it when the configuration allows it, and a missing
//! credential in a production configuration is a hard error.

mod mock;
mod pinata;

pub use mock::MockStore;
pub use pinata::PinataStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::error::{KeepRealError, Result};
use crate::record::LocationData;

/// Application payload pinned alongside the image and recovered during
/// gallery sync. This is the authoritative part of the pinned metadata
/// document; the surrounding NFT-style envelope is display sugar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub caption: String,
    /// Capture time in Unix milliseconds, when the user embedded it.
    pub timestamp: Option<i64>,
    pub location: Option<LocationData>,
    /// Content identifier of the pinned image this document describes.
    pub image_cid: String,
}

/// A content-addressed store for capture images and their metadata.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload image bytes, returning their content identifier.
    async fn store_image(&self, bytes: Vec<u8>) -> Result<String>;

    /// Upload the metadata document referencing an already-pinned image.
    async fn store_metadata(&self, metadata: &MemoryMetadata) -> Result<String>;

    /// Resolve a pinned metadata document. `Ok(None)` means the identifier
    /// points at something that is not a recoverable metadata document
    /// (e.g. the image itself was registered on-chain directly).
    async fn fetch_metadata(&self, cid: &str) -> Result<Option<MemoryMetadata>>;

    /// Public URL serving the content behind an identifier.
    fn gateway_url(&self, cid: &str) -> String;
}

/// Select a content store from configuration.
///
/// A configured credential selects the real pinning client. A missing
/// credential falls back to the deterministic mock only when
/// `allow_mock_store` is set; otherwise it is a hard error.
pub fn from_config(config: &Config) -> Result<Arc<dyn ContentStore>> {
    match &config.pinata_jwt {
        Some(jwt) => Ok(Arc::new(PinataStore::new(
            config.pinata_api_url.clone(),
            jwt.clone(),
            config.ipfs_gateway.clone(),
            config.http_timeout_secs,
        )?)),
        None if config.allow_mock_store => {
            warn!("Pinning credential not configured, using MOCK content store (dev only, nothing is pinned)");
            Ok(Arc::new(MockStore::new(config.ipfs_gateway.clone())))
        }
        None => Err(KeepRealError::MissingCredentials),
    }
}
