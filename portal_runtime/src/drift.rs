//! Drift detection: structured comparison of two snapshots.
//!
//! Read flags only ever go from unread to read, so a forward drift lists
//! newly read ids. Ids read in `a` but unread in `b` land in the
//! `reverted_*` lists; a store never produces those on its own.

use std::collections::BTreeMap;

use directory_store::domain::{MessageId, NotificationId};
use directory_store::hashing::canonical_hash;
use directory_store::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub unread_messages_a: usize,
    pub unread_messages_b: usize,
    pub unread_messages_delta: i64,
    pub unread_notifications_a: usize,
    pub unread_notifications_b: usize,
    pub unread_notifications_delta: i64,
    pub newly_read_messages: Vec<MessageId>,
    pub newly_read_notifications: Vec<NotificationId>,
    pub reverted_messages: Vec<MessageId>,
    pub reverted_notifications: Vec<NotificationId>,
    pub hash_a: String,
    pub hash_b: String,
}

impl DriftReport {
    pub fn is_identical(&self) -> bool {
        self.hash_a == self.hash_b
    }
}

/// Ids present in both maps whose flag went false->true (`newly`) or
/// true->false (`reverted`), ascending.
fn flag_changes<K: Ord + Copy>(a: &BTreeMap<K, bool>, b: &BTreeMap<K, bool>) -> (Vec<K>, Vec<K>) {
    let mut newly = Vec::new();
    let mut reverted = Vec::new();
    for (id, was) in a {
        match b.get(id) {
            Some(&now) if !was && now => newly.push(*id),
            Some(&now) if *was && !now => reverted.push(*id),
            _ => {}
        }
    }
    (newly, reverted)
}

fn delta(a: usize, b: usize) -> i64 {
    b as i64 - a as i64
}

pub fn compare_snapshots(a: &Snapshot, b: &Snapshot) -> DriftReport {
    let messages = |s: &Snapshot| -> BTreeMap<MessageId, bool> {
        s.messages.iter().map(|m| (m.id, m.read)).collect()
    };
    let notifications = |s: &Snapshot| -> BTreeMap<NotificationId, bool> {
        s.notifications.iter().map(|n| (n.id, n.read)).collect()
    };

    let (newly_read_messages, reverted_messages) = flag_changes(&messages(a), &messages(b));
    let (newly_read_notifications, reverted_notifications) =
        flag_changes(&notifications(a), &notifications(b));

    DriftReport {
        unread_messages_a: a.unread_messages,
        unread_messages_b: b.unread_messages,
        unread_messages_delta: delta(a.unread_messages, b.unread_messages),
        unread_notifications_a: a.unread_notifications,
        unread_notifications_b: b.unread_notifications,
        unread_notifications_delta: delta(a.unread_notifications, b.unread_notifications),
        newly_read_messages,
        newly_read_notifications,
        reverted_messages,
        reverted_notifications,
        hash_a: canonical_hash(a),
        hash_b: canonical_hash(b),
    }
}
