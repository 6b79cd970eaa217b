#![forbid(unsafe_code)]

//! Student directory store.
//!
//! The in-memory source of truth behind the student portal: typed domain
//! records, a mock seed, the two read-flag mutations, derived metrics and a
//! publish-subscribe store that recomputes unread counts on every change.

/// Version of the dataset shape. Bound into every canonical hash.
pub const DATASET_VERSION: u32 = 1;

pub mod domain;
pub mod error;
pub mod events;
pub mod hashing;
pub mod invariants;
pub mod metrics;
pub mod seed;
pub mod state;
pub mod store;
pub mod transitions;

pub use error::StoreError;
pub use events::{JournalEntry, Mutation, MutationOutcome};
pub use state::Snapshot;
pub use store::{DirectoryStore, Subscription};
