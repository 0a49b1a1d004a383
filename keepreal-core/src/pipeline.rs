//! The capture-to-proof pipeline.
//!
//! Thin orchestration over the other components: reality check, hash, pin
//! image, pin metadata, derive address, submit, cache. Steps are strictly
//! sequential because each depends on the previous step's output, and no
//! step retries on its own — a failed attempt is retried by the user
//! re-triggering it.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::cache::GalleryCache;
use crate::error::{KeepRealError, Result};
use crate::hasher;
use crate::ipfs::{ContentStore, MemoryMetadata};
use crate::ledger::{program, Ledger, OwnedProof, WalletSigner};
use crate::policy::{CaptureContext, RealityPolicy};
use crate::reconcile;
use crate::record::{display_jitter, ConfirmationState, LocationData, Record, MAX_CAPTION_LEN};

/// A confirmed capture ready to be minted.
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// Encoded image bytes as they came off the camera.
    pub image: Vec<u8>,
    pub caption: String,
    pub capture: CaptureContext,
    /// Embed the capture time in the record (user preference).
    pub include_timestamp: bool,
    pub location: Option<LocationData>,
}

/// Result of a mint attempt. The record is always cached; `signature` is
/// present only when the ledger confirmed the submission.
#[derive(Debug, Clone)]
pub struct MintOutcome {
    pub record: Record,
    pub signature: Option<String>,
}

pub struct Minter {
    policy: RealityPolicy,
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn Ledger>,
    cache: GalleryCache,
}

impl Minter {
    pub fn new(
        policy: RealityPolicy,
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn Ledger>,
        cache: GalleryCache,
    ) -> Self {
        Self {
            policy,
            store,
            ledger,
            cache,
        }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Run the full capture-to-proof pipeline.
    ///
    /// Policy, validation and upload failures abort before any cache
    /// mutation. Once the optimistic record is inserted, a failed ledger
    /// submission is non-fatal: the record stays cached, downgraded to
    /// [`ConfirmationState::Unconfirmed`], and the outcome carries no
    /// transaction signature.
    pub async fn mint(&self, signer: &dyn WalletSigner, request: MintRequest) -> Result<MintOutcome> {
        let MintRequest {
            image,
            caption,
            capture,
            include_timestamp,
            location,
        } = request;

        let caption_len = caption.chars().count();
        if caption_len > MAX_CAPTION_LEN {
            return Err(KeepRealError::CaptionTooLong {
                len: caption_len,
                max: MAX_CAPTION_LEN,
            });
        }

        self.policy.verify(&capture)?;

        let image_hash = hasher::content_hash(&image);
        info!(
            hash = %hex::encode(&image_hash[..8]),
            bytes = image.len(),
            "Hashed capture"
        );

        let image_cid = self.store.store_image(image).await?;

        let timestamp_ms = include_timestamp.then(|| capture.captured_at.timestamp_millis());
        let metadata = MemoryMetadata {
            caption: caption.clone(),
            timestamp: timestamp_ms,
            location: location.clone(),
            image_cid: image_cid.clone(),
        };
        let metadata_cid = self.store.store_metadata(&metadata).await?;

        let owner = signer.pubkey();
        let (record_address, _bump) = program::derive_record_address(&owner, &image_hash);

        let args = program::MintMemoryArgs {
            image_hash,
            ipfs_cid: metadata_cid.clone(),
            app_signature: [0u8; 64],
            timestamp: capture.captured_at.timestamp(),
        };
        // Validate the on-chain arguments while aborting is still free of
        // side effects; past this point the optimistic record is committed.
        args.validate()?;

        let record = Record {
            id: record_address.to_string(),
            owner: owner.to_string(),
            content_hash: image_hash,
            content_id: image_cid,
            metadata_content_id: Some(metadata_cid.clone()),
            caption,
            timestamp: timestamp_ms,
            location,
            state: ConfirmationState::Pending,
            display_rotation: display_jitter(),
        };

        // Optimistic insert: the record is visible locally before the
        // ledger round-trip completes.
        let owner_key = record.owner.clone();
        let gallery = self.cache.load(&owner_key)?;
        self.cache
            .save(&owner_key, &reconcile::insert_optimistic(gallery, record.clone()))?;

        match self.ledger.submit_mint(signer, args).await {
            Ok(receipt) => {
                info!(
                    signature = %receipt.signature,
                    record = %receipt.record_address,
                    "Mint confirmed on ledger"
                );
                let record =
                    self.commit_state(&owner_key, &record.id, ConfirmationState::Confirmed)?;
                Ok(MintOutcome {
                    record,
                    signature: Some(receipt.signature),
                })
            }
            Err(KeepRealError::SubmissionFailed(reason)) => {
                // Submission failure is not destructive: the local copy
                // survives, flagged unconfirmed.
                warn!(record = %record.id, %reason, "Submission failed, keeping record unconfirmed");
                let record =
                    self.commit_state(&owner_key, &record.id, ConfirmationState::Unconfirmed)?;
                Ok(MintOutcome {
                    record,
                    signature: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Persist a confirmation-state transition for a cached record and
    /// return the updated snapshot.
    fn commit_state(
        &self,
        owner_key: &str,
        record_id: &str,
        state: ConfirmationState,
    ) -> Result<Record> {
        let gallery = reconcile::set_state(self.cache.load(owner_key)?, record_id, state);
        self.cache.save(owner_key, &gallery)?;
        gallery
            .into_iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| {
                KeepRealError::InvalidRecord(format!("record {record_id} vanished during commit"))
            })
    }

    /// Reconcile the local gallery with ledger state for `owner`.
    ///
    /// Runs once per identity-connect. May interleave with an in-flight
    /// mint; the shared record-address identifier makes the race benign
    /// (the merge dedups on id).
    pub async fn sync(&self, owner: &Pubkey) -> Result<Vec<Record>> {
        let proofs = self.ledger.query_by_owner(owner).await?;
        info!(owner = %owner, fetched = proofs.len(), "Syncing memories");

        let mut remote = Vec::with_capacity(proofs.len());
        for owned in proofs {
            remote.push(self.resolve_proof(owned).await);
        }

        let owner_key = owner.to_string();
        let merged = reconcile::merge(self.cache.load(&owner_key)?, remote);
        self.cache.save(&owner_key, &merged)?;
        Ok(merged)
    }

    /// Close a record's on-chain account and drop it from the gallery.
    pub async fn revoke(&self, signer: &dyn WalletSigner, record_id: &str) -> Result<()> {
        let address: Pubkey = record_id
            .parse()
            .map_err(|e| KeepRealError::InvalidRecord(format!("invalid record address {record_id}: {e}")))?;

        let receipt = self.ledger.submit_revoke(signer, &address).await?;
        info!(signature = %receipt.signature, record = %record_id, "Record revoked on ledger");

        let owner_key = signer.pubkey().to_string();
        let gallery = reconcile::remove(self.cache.load(&owner_key)?, record_id);
        self.cache.save(&owner_key, &gallery)?;
        Ok(())
    }

    /// The locally cached gallery for an owner.
    pub fn gallery(&self, owner: &str) -> Result<Vec<Record>> {
        self.cache.load(owner)
    }

    /// Build a gallery record from an on-chain proof, recovering caption
    /// and location from the pinned metadata document when possible.
    /// Resolution failure degrades the record's fields, it never excludes
    /// the record.
    async fn resolve_proof(&self, owned: OwnedProof) -> Record {
        let OwnedProof { address, proof } = owned;

        let metadata = match self.store.fetch_metadata(&proof.ipfs_cid).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(cid = %proof.ipfs_cid, error = %e, "Metadata resolution failed");
                None
            }
        };

        let owner = proof.owner_pubkey().to_string();
        match metadata {
            Some(meta) => Record {
                id: address.to_string(),
                owner,
                content_hash: proof.image_hash,
                content_id: meta.image_cid,
                metadata_content_id: Some(proof.ipfs_cid),
                caption: meta.caption,
                timestamp: meta.timestamp,
                location: meta.location,
                state: ConfirmationState::Confirmed,
                display_rotation: display_jitter(),
            },
            // No recoverable metadata: the on-chain identifier is treated
            // as the image itself, with empty caption and location.
            None => Record {
                id: address.to_string(),
                owner,
                content_hash: proof.image_hash,
                content_id: proof.ipfs_cid.clone(),
                metadata_content_id: None,
                caption: String::new(),
                // On-chain timestamps are seconds; records carry millis.
                timestamp: Some(proof.timestamp.saturating_mul(1000)),
                location: None,
                state: ConfirmationState::Confirmed,
                display_rotation: display_jitter(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipfs::MockStore;
    use crate::ledger::SubmitReceipt;
    use chrono::{Duration, Utc};
    use solana_sdk::signature::Keypair;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory ledger double. Minted proofs become queryable, exactly
    /// like confirmed accounts on chain.
    #[derive(Default)]
    struct FakeLedger {
        fail_submit: AtomicBool,
        proofs: Mutex<Vec<OwnedProof>>,
    }

    impl FakeLedger {
        fn seed(&self, owner: &Pubkey, image_hash: [u8; 32], cid: &str) -> Pubkey {
            let (address, _) = program::derive_record_address(owner, &image_hash);
            self.proofs.lock().unwrap().push(OwnedProof {
                address,
                proof: program::RealityProofAccount {
                    owner: owner.to_bytes(),
                    image_hash,
                    ipfs_cid: cid.to_string(),
                    app_signature: [0u8; 64],
                    timestamp: Utc::now().timestamp(),
                    is_verified: true,
                },
            });
            address
        }
    }

    #[async_trait::async_trait]
    impl Ledger for FakeLedger {
        async fn submit_mint(
            &self,
            signer: &dyn WalletSigner,
            args: program::MintMemoryArgs,
        ) -> Result<SubmitReceipt> {
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(KeepRealError::SubmissionFailed(
                    "insufficient funds".to_string(),
                ));
            }
            let owner = signer.pubkey();
            let address = self.seed(&owner, args.image_hash, &args.ipfs_cid);
            Ok(SubmitReceipt {
                signature: "fake-signature".to_string(),
                record_address: address,
            })
        }

        async fn submit_revoke(
            &self,
            _signer: &dyn WalletSigner,
            record_address: &Pubkey,
        ) -> Result<SubmitReceipt> {
            self.proofs
                .lock()
                .unwrap()
                .retain(|p| p.address != *record_address);
            Ok(SubmitReceipt {
                signature: "fake-signature".to_string(),
                record_address: *record_address,
            })
        }

        async fn query_by_owner(&self, owner: &Pubkey) -> Result<Vec<OwnedProof>> {
            Ok(self
                .proofs
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.proof.owner == owner.to_bytes())
                .cloned()
                .collect())
        }
    }

    /// Wraps a store and counts uploads, to assert aborted pipelines never
    /// reach the network.
    struct CountingStore {
        inner: MockStore,
        uploads: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MockStore::new(String::new()),
                uploads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ContentStore for CountingStore {
        async fn store_image(&self, bytes: Vec<u8>) -> Result<String> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.inner.store_image(bytes).await
        }

        async fn store_metadata(&self, metadata: &MemoryMetadata) -> Result<String> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.inner.store_metadata(metadata).await
        }

        async fn fetch_metadata(&self, cid: &str) -> Result<Option<MemoryMetadata>> {
            self.inner.fetch_metadata(cid).await
        }

        fn gateway_url(&self, cid: &str) -> String {
            self.inner.gateway_url(cid)
        }
    }

    struct Harness {
        minter: Minter,
        ledger: Arc<FakeLedger>,
        store: Arc<CountingStore>,
        _dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(FakeLedger::default());
        let store = Arc::new(CountingStore::new());
        let minter = Minter::new(
            RealityPolicy::new(Duration::seconds(600), false),
            store.clone(),
            ledger.clone(),
            GalleryCache::new(dir.path()),
        );
        Harness {
            minter,
            ledger,
            store,
            _dir: dir,
        }
    }

    fn request(age: Duration) -> MintRequest {
        MintRequest {
            image: b"raw camera frame".to_vec(),
            caption: "golden hour".to_string(),
            capture: CaptureContext {
                captured_at: Utc::now() - age,
                camera_present: true,
                mobile_device: true,
            },
            include_timestamp: true,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_fresh_capture_mints_and_confirms() {
        let h = harness();
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer).to_string();

        let outcome = h.minter.mint(&signer, request(Duration::minutes(5))).await.unwrap();

        assert_eq!(outcome.record.state, ConfirmationState::Confirmed);
        assert!(outcome.signature.is_some());

        // The record id is the derived ledger address.
        let expected = program::derive_record_address(
            &WalletSigner::pubkey(&signer),
            &hasher::content_hash(b"raw camera frame"),
        )
        .0
        .to_string();
        assert_eq!(outcome.record.id, expected);

        let gallery = h.minter.gallery(&owner).unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].state, ConfirmationState::Confirmed);
        assert_eq!(gallery[0].caption, "golden hour");
    }

    #[tokio::test]
    async fn test_stale_capture_aborts_before_any_side_effect() {
        let h = harness();
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer).to_string();

        let result = h.minter.mint(&signer, request(Duration::minutes(15))).await;

        assert!(matches!(result, Err(KeepRealError::StaleCapture { .. })));
        // No upload attempted, no cache mutation.
        assert_eq!(h.store.uploads.load(Ordering::SeqCst), 0);
        assert!(h.minter.gallery(&owner).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_keeps_unconfirmed_record() {
        let h = harness();
        h.ledger.fail_submit.store(true, Ordering::SeqCst);
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer).to_string();

        let outcome = h.minter.mint(&signer, request(Duration::minutes(1))).await.unwrap();

        assert_eq!(outcome.record.state, ConfirmationState::Unconfirmed);
        assert!(outcome.signature.is_none());

        let gallery = h.minter.gallery(&owner).unwrap();
        let hash = hasher::content_hash(b"raw camera frame");
        let matching: Vec<_> = gallery.iter().filter(|r| r.content_hash == hash).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].state, ConfirmationState::Unconfirmed);
    }

    #[tokio::test]
    async fn test_caption_over_bound_rejected() {
        let h = harness();
        let signer = Keypair::new();

        let mut req = request(Duration::minutes(1));
        req.caption = "x".repeat(101);

        assert!(matches!(
            h.minter.mint(&signer, req).await,
            Err(KeepRealError::CaptionTooLong { len: 101, max: 100 })
        ));
        assert_eq!(h.store.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_prepends_new_ledger_records() {
        let h = harness();
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer);

        // One record already cached locally via a mint.
        h.minter.mint(&signer, request(Duration::minutes(1))).await.unwrap();

        // Two records exist only on the ledger.
        h.ledger.seed(&owner, [41u8; 32], "QmRemoteOne");
        h.ledger.seed(&owner, [42u8; 32], "QmRemoteTwo");

        let merged = h.minter.sync(&owner).await.unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2].caption, "golden hour");

        // Idempotent on reconnect.
        let again = h.minter.sync(&owner).await.unwrap();
        assert_eq!(again.len(), 3);
    }

    #[tokio::test]
    async fn test_sync_recovers_caption_from_metadata() {
        let h = harness();
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer);

        // Mint pins metadata into the mock store; wipe the cache to force
        // the sync path to rebuild the record from chain + metadata.
        let outcome = h.minter.mint(&signer, request(Duration::minutes(1))).await.unwrap();
        h.minter.cache.save(&owner.to_string(), &[]).unwrap();

        let merged = h.minter.sync(&owner).await.unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].caption, "golden hour");
        assert_eq!(merged[0].content_id, outcome.record.content_id);
        assert_eq!(
            merged[0].metadata_content_id,
            outcome.record.metadata_content_id
        );
    }

    #[tokio::test]
    async fn test_sync_degrades_when_metadata_unresolvable() {
        let h = harness();
        let owner = WalletSigner::pubkey(&Keypair::new());

        // A proof whose CID resolves to nothing in the store.
        h.ledger.seed(&owner, [7u8; 32], "QmOpaque");

        let merged = h.minter.sync(&owner).await.unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].caption, "");
        assert_eq!(merged[0].content_id, "QmOpaque");
        assert_eq!(merged[0].metadata_content_id, None);
        assert_eq!(merged[0].state, ConfirmationState::Confirmed);
    }

    #[tokio::test]
    async fn test_revoke_removes_from_ledger_and_cache() {
        let h = harness();
        let signer = Keypair::new();
        let owner = WalletSigner::pubkey(&signer);

        let outcome = h.minter.mint(&signer, request(Duration::minutes(1))).await.unwrap();
        assert_eq!(h.minter.gallery(&owner.to_string()).unwrap().len(), 1);

        h.minter.revoke(&signer, &outcome.record.id).await.unwrap();

        assert!(h.minter.gallery(&owner.to_string()).unwrap().is_empty());
        assert!(h.ledger.query_by_owner(&owner).await.unwrap().is_empty());
    }
}
