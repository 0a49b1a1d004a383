//! Gallery reconciliation: pure transitions over immutable record snapshots.
//!
//! The pipeline mutates nothing in place. Each operation here takes a
//! snapshot, returns the next one, and the caller commits it through
//! [`crate::cache::GalleryCache::save`].

use std::collections::HashSet;

use tracing::debug;

use crate::record::{ConfirmationState, Record};

/// Merge ledger-sourced records into the locally cached list.
///
/// Dedup key is the record id. Remote records not present locally are
/// prepended in order; local records are never mutated, reordered relative
/// to each other, or removed. Re-running with the same remote set is a
/// no-op.
pub fn merge(local: Vec<Record>, remote: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<String> = local.iter().map(|r| r.id.clone()).collect();

    let mut merged: Vec<Record> = remote
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();

    debug!(added = merged.len(), kept = local.len(), "Merged gallery");
    merged.extend(local);
    merged
}

/// Prepend an optimistic record to the gallery.
pub fn insert_optimistic(mut records: Vec<Record>, record: Record) -> Vec<Record> {
    records.insert(0, record);
    records
}

/// Transition the record with the given id to a new confirmation state.
pub fn set_state(records: Vec<Record>, id: &str, state: ConfirmationState) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut r| {
            if r.id == id {
                r.state = state;
            }
            r
        })
        .collect()
}

/// Drop the record with the given id (revocation).
pub fn remove(records: Vec<Record>, id: &str) -> Vec<Record> {
    records.into_iter().filter(|r| r.id != id).collect()
}
