//! Canonical hashing.
//!
//! Deterministic canonical serialization + SHA-256 of the observable store
//! state. Two snapshots with the same collections and counters hash the
//! same, whatever path of mutations produced them.
//!
//! Rules:
//!   - dataset_version is the first field
//!   - every collection sorted by id
//!   - the journal sequence is NOT part of the hash
//!   - UTF-8 JSON, no whitespace

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::state::Snapshot;
use crate::DATASET_VERSION;

/// Canonical serialization of a snapshot to UTF-8 JSON bytes.
pub fn canonical_serialize(snapshot: &Snapshot) -> Vec<u8> {
    let obj = build_canonical_value(snapshot);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(snapshot: &Snapshot) -> String {
    hex_digest(&canonical_serialize(snapshot))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn sorted<T: Serialize + Clone, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Value {
    let mut items = items.to_vec();
    items.sort_by_key(|item| key(item));
    serde_json::to_value(items).expect("domain types always serialize")
}

/// Field order: dataset_version, student, subjects, grades, events,
/// payments, messages, notifications, resources, unread_messages,
/// unread_notifications.
fn build_canonical_value(s: &Snapshot) -> Value {
    let mut root = Map::new();
    root.insert(
        "dataset_version".to_string(),
        Value::Number(DATASET_VERSION.into()),
    );
    root.insert(
        "student".to_string(),
        serde_json::to_value(&s.student).expect("domain types always serialize"),
    );
    root.insert("subjects".to_string(), sorted(&s.subjects, |x| x.id));
    root.insert("grades".to_string(), sorted(&s.grades, |x| x.id));
    root.insert("events".to_string(), sorted(&s.events, |x| x.id));
    root.insert("payments".to_string(), sorted(&s.payments, |x| x.id));
    root.insert("messages".to_string(), sorted(&s.messages, |x| x.id));
    root.insert(
        "notifications".to_string(),
        sorted(&s.notifications, |x| x.id),
    );
    root.insert("resources".to_string(), sorted(&s.resources, |x| x.id));
    root.insert(
        "unread_messages".to_string(),
        Value::Number(s.unread_messages.into()),
    );
    root.insert(
        "unread_notifications".to_string(),
        Value::Number(s.unread_notifications.into()),
    );
    Value::Object(root)
}
