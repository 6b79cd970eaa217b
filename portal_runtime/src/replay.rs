//! Replay orchestrator: rebuild a store from its seed and journal.
//!
//! Delegates every state change to the store. No shortcuts, no cached
//! state.

use directory_store::domain::Dataset;
use directory_store::hashing::canonical_hash;
use directory_store::{DirectoryStore, JournalEntry, Snapshot, StoreError};

/// Apply `journal` to a fresh store over `seed`.
///
/// Returns the final snapshot and its canonical hash. Deterministic: the
/// same seed and journal always produce the same hash.
pub fn rebuild_snapshot(
    seed: &Dataset,
    journal: &[JournalEntry],
) -> Result<(Snapshot, String), StoreError> {
    let mut store = DirectoryStore::new(seed.clone())?;
    for entry in journal {
        store.apply(entry.mutation);
    }
    let snapshot = store.get_state();
    let hash = canonical_hash(&snapshot);
    Ok((snapshot, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(seed: &Dataset, journal: &[JournalEntry]) -> Result<String, StoreError> {
    rebuild_snapshot(seed, journal).map(|(_, hash)| hash)
}

/// Replay twice and panic if the two hashes differ.
pub fn verify_determinism(seed: &Dataset, journal: &[JournalEntry]) -> Result<(), StoreError> {
    let first = rebuild_hash(seed, journal)?;
    let second = rebuild_hash(seed, journal)?;
    if first != second {
        panic!(
            "DETERMINISM FAILURE: two replays produced different hashes.\n\
             Run 1: {}\n\
             Run 2: {}",
            first, second
        );
    }
    Ok(())
}
