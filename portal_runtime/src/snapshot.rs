//! Snapshot records: canonical JSON plus hash, captured in memory.
//!
//! A record carries no wall-clock timestamp, so capturing the same state
//! twice yields identical records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use directory_store::hashing::{canonical_hash, canonical_serialize};
use directory_store::{Snapshot, DATASET_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Journal position at capture time.
    pub sequence: u64,
    /// Canonical JSON of the state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of `canonical_json`.
    pub hash: String,
    pub dataset_version: u32,
}

pub fn capture(snapshot: &Snapshot) -> SnapshotRecord {
    let canonical_json = String::from_utf8(canonical_serialize(snapshot))
        .expect("canonical JSON is always valid UTF-8");
    SnapshotRecord {
        sequence: snapshot.sequence,
        canonical_json,
        hash: canonical_hash(snapshot),
        dataset_version: DATASET_VERSION,
    }
}

/// Recompute SHA-256 over the stored JSON and compare with the stored hash.
pub fn verify_snapshot_hash(record: &SnapshotRecord) -> bool {
    let computed: String = Sha256::digest(record.canonical_json.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    computed == record.hash
}
