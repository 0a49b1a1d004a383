//! Content digest binding a record to its original image bytes.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of the encoded image bytes.
///
/// The digest is a derivation seed for the on-ledger record address, so it
/// must be byte-for-byte reproducible by every client and by the ledger
/// program. Same bytes always produce the same digest.
pub fn content_hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}
