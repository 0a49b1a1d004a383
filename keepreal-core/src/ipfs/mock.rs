//! Mock content store for credential-less development.
//!
//! WARNING: nothing is pinned anywhere. Identifiers are derived from the
//! content bytes, so repeated runs over the same capture agree, and pinned
//! metadata is kept in memory so gallery sync still resolves within one
//! process.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::{ContentStore, MemoryMetadata};
use crate::error::{KeepRealError, Result};
use crate::hasher;

pub struct MockStore {
    gateway: String,
    pinned: Mutex<HashMap<String, MemoryMetadata>>,
}

impl MockStore {
    pub fn new(gateway: String) -> Self {
        Self {
            gateway,
            pinned: Mutex::new(HashMap::new()),
        }
    }

    /// Derive a stable pseudo-CID from content bytes. Base58-ish alphabet
    /// keeps the identifier shaped like a CIDv0.
    fn mock_cid(bytes: &[u8]) -> String {
        const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

        let digest = hasher::content_hash(bytes);
        let mut cid = String::with_capacity(46);
        cid.push_str("Qm");
        for i in 0..44usize {
            let byte = digest[i % 32].wrapping_add(i as u8);
            cid.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
        }
        cid
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn store_image(&self, bytes: Vec<u8>) -> Result<String> {
        let cid = Self::mock_cid(&bytes);
        warn!(cid = %cid, "MOCK content store: image not actually pinned");
        Ok(cid)
    }

    async fn store_metadata(&self, metadata: &MemoryMetadata) -> Result<String> {
        let doc = serde_json::to_vec(metadata)
            .map_err(|e| KeepRealError::Serialization(e.to_string()))?;
        let cid = Self::mock_cid(&doc);
        warn!(cid = %cid, "MOCK content store: metadata not actually pinned");

        self.pinned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(cid.clone(), metadata.clone());
        Ok(cid)
    }

    async fn fetch_metadata(&self, cid: &str) -> Result<Option<MemoryMetadata>> {
        Ok(self
            .pinned
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(cid)
            .cloned())
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("{}{cid}", self.gateway)
    }
}
