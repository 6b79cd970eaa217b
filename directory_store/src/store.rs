//! The student directory store.
//!
//! Owns the dataset, applies mutations through `transitions`, journals the
//! ones that changed state and pushes a fresh snapshot to every subscriber
//! before the mutating call returns.
//!
//! Single-threaded by construction: listeners live behind `Rc<RefCell<..>>`,
//! so neither the store nor its subscriptions are `Send`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::domain::{Dataset, MessageId, NotificationId};
use crate::error::StoreError;
use crate::events::{JournalEntry, Mutation, MutationOutcome};
use crate::hashing::canonical_hash;
use crate::invariants::{check_unread_counts, validate_dataset};
use crate::seed::{mock_dataset, read_dataset};
use crate::state::{build_snapshot_at, Snapshot};
use crate::transitions::apply_mutation;

type Listener = Box<dyn FnMut(&Snapshot)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
    /// Set while callbacks run; their entries are temporarily taken out.
    notifying: bool,
    /// Subscriptions dropped from inside a callback.
    cancelled: Vec<u64>,
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Explicit form of dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Store already gone: nothing left to detach from.
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let removed = {
            let mut l = listeners.borrow_mut();
            if l.notifying {
                l.cancelled.push(self.id);
            }
            l.entries.remove(&self.id)
        };
        // Released outside the borrow: the closure may own subscriptions too.
        drop(removed);
    }
}

/// Single source of truth for the portal's dataset.
pub struct DirectoryStore {
    dataset: Dataset,
    journal: Vec<JournalEntry>,
    listeners: Rc<RefCell<Listeners>>,
}

impl DirectoryStore {
    /// Validate `dataset` and build a store around it.
    pub fn new(dataset: Dataset) -> Result<Self, StoreError> {
        validate_dataset(&dataset)?;
        Ok(Self::from_valid(dataset))
    }

    /// Read a JSON dataset from `path` and build a store around it. The
    /// dataset is validated once, here.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Self::new(read_dataset(path)?)
    }

    /// Store seeded with the built-in mock dataset.
    pub fn with_mock_data() -> Self {
        Self::from_valid(mock_dataset())
    }

    fn from_valid(dataset: Dataset) -> Self {
        debug!(
            messages = dataset.messages.len(),
            notifications = dataset.notifications.len(),
            "directory store seeded"
        );
        Self {
            dataset,
            journal: Vec::new(),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Current snapshot, with unread counts derived on the spot.
    pub fn get_state(&self) -> Snapshot {
        build_snapshot_at(&self.dataset, self.sequence())
    }

    /// Borrow the raw collections without cloning.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn unread_messages(&self) -> usize {
        self.dataset.unread_messages()
    }

    pub fn unread_notifications(&self) -> usize {
        self.dataset.unread_notifications()
    }

    /// Mutations that changed state, in application order.
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn sequence(&self) -> u64 {
        self.journal.last().map(|e| e.sequence).unwrap_or(0)
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(&self.get_state())
    }

    // ── Mutations ──────────────────────────────────────────────────

    pub fn mark_message_as_read(&mut self, id: MessageId) -> MutationOutcome {
        self.apply(Mutation::MarkMessageRead(id))
    }

    pub fn mark_notification_as_read(&mut self, id: NotificationId) -> MutationOutcome {
        self.apply(Mutation::MarkNotificationRead(id))
    }

    pub fn mark_all_notifications_as_read(&mut self) -> MutationOutcome {
        self.apply(Mutation::MarkAllNotificationsRead)
    }

    /// Apply a mutation. Misses and repeats are silent no-ops: nothing is
    /// journaled and no subscriber is notified.
    pub fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let outcome = apply_mutation(&mut self.dataset, &mutation);
        if !outcome.changed() {
            trace!(
                mutation = mutation.name(),
                target_id = ?mutation.target_id(),
                ?outcome,
                "mutation was a no-op"
            );
            return outcome;
        }

        let sequence = self.sequence() + 1;
        self.journal.push(JournalEntry { sequence, mutation });

        let snapshot = self.get_state();
        if cfg!(debug_assertions) {
            check_unread_counts(&snapshot);
        }
        debug!(
            mutation = mutation.name(),
            target_id = ?mutation.target_id(),
            sequence,
            unread_messages = snapshot.unread_messages,
            unread_notifications = snapshot.unread_notifications,
            "mutation applied"
        );
        self.notify(&snapshot);
        outcome
    }

    // ── Subscriptions ──────────────────────────────────────────────

    /// Register a listener for every state change. The listener must not
    /// call back into the store.
    pub fn subscribe(&self, listener: impl FnMut(&Snapshot) + 'static) -> Subscription {
        let mut l = self.listeners.borrow_mut();
        l.next_id += 1;
        let id = l.next_id;
        l.entries.insert(id, Box::new(listener));
        trace!(subscription = id, "listener subscribed");
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    fn notify(&self, snapshot: &Snapshot) {
        let mut running = {
            let mut l = self.listeners.borrow_mut();
            l.notifying = true;
            std::mem::take(&mut l.entries)
        };

        for listener in running.values_mut() {
            listener(snapshot);
        }

        let dropped: Vec<Listener> = {
            let mut l = self.listeners.borrow_mut();
            l.notifying = false;
            let dropped = std::mem::take(&mut l.cancelled)
                .into_iter()
                .filter_map(|id| running.remove(&id))
                .collect();
            l.entries.append(&mut running);
            dropped
        };
        drop(dropped);
    }
}
