//! Durable per-identity gallery cache.
//!
//! One JSON file per owning identity under a data directory. The cache is
//! an offline/optimistic view only; the ledger stays authoritative for
//! confirmed records. Switching identity swaps the visible gallery
//! entirely.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{KeepRealError, Result};
use crate::record::Record;

pub struct GalleryCache {
    root: PathBuf,
}

impl GalleryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage key namespaced with the owning identity.
    fn path_for(&self, owner: &str) -> PathBuf {
        self.root.join(format!("gallery_{owner}.json"))
    }

    /// Load the gallery for an owner. A missing file is an empty gallery.
    pub fn load(&self, owner: &str) -> Result<Vec<Record>> {
        let path = self.path_for(owner);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            KeepRealError::Serialization(format!("corrupt gallery file {}: {e}", path.display()))
        })
    }

    /// Persist the gallery for an owner, replacing the previous snapshot.
    pub fn save(&self, owner: &str, records: &[Record]) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| KeepRealError::Serialization(e.to_string()))?;
        fs::write(self.path_for(owner), json)?;

        debug!(owner, count = records.len(), "Saved gallery");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ConfirmationState, Record};
    use tempfile::TempDir;

    fn record(id: &str) -> Record {
        Record {
            id: id.to_string(),
            owner: "owner".to_string(),
            content_hash: [1u8; 32],
            content_id: "QmCacheTest".to_string(),
            metadata_content_id: None,
            caption: "cached".to_string(),
            timestamp: Some(1_700_000_000_000),
            location: None,
            state: ConfirmationState::Confirmed,
            display_rotation: 1.5,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let cache = GalleryCache::new(dir.path());
        assert!(cache.load("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = GalleryCache::new(dir.path());
        let records = vec![record("one"), record("two")];

        cache.save("owner-a", &records).unwrap();

        assert_eq!(cache.load("owner-a").unwrap(), records);
    }

    #[test]
    fn test_cache_partitioned_per_owner() {
        let dir = TempDir::new().unwrap();
        let cache = GalleryCache::new(dir.path());

        cache.save("owner-a", &[record("a-1")]).unwrap();
        cache.save("owner-b", &[record("b-1"), record("b-2")]).unwrap();

        assert_eq!(cache.load("owner-a").unwrap().len(), 1);
        assert_eq!(cache.load("owner-b").unwrap().len(), 2);
        assert!(cache.load("owner-c").unwrap().is_empty());
    }

    #[test]
    fn test_durable_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let cache = GalleryCache::new(dir.path());
            cache.save("owner-a", &[record("persisted")]).unwrap();
        }

        let reopened = GalleryCache::new(dir.path());
        let records = reopened.load("owner-a").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "persisted");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = GalleryCache::new(dir.path());
        std::fs::write(dir.path().join("gallery_owner-a.json"), b"not json").unwrap();

        assert!(matches!(
            cache.load("owner-a"),
            Err(KeepRealError::Serialization(_))
        ));
    }
}
