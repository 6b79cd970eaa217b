//! Portal session: one student's store, tutor and settings.
//!
//! Each session owns an isolated store; nothing is global. Teardown
//! cancels pending tutor replies and drops the session's subscriptions,
//! and it runs on drop if the owner never called it.

use chrono::NaiveDate;
use tracing::info;

use directory_store::domain::{Dataset, MessageId, NotificationId};
use directory_store::{DirectoryStore, MutationOutcome, Snapshot, StoreError, Subscription};

use crate::config::PortalConfig;
use crate::pages::{self, DashboardSummary, NotificationStats, PaymentsSummary, PerformanceReport};
use crate::tutor::{focus_subjects, TaskId, Tutor};

pub struct PortalSession {
    config: PortalConfig,
    store: DirectoryStore,
    tutor: Tutor,
    subscriptions: Vec<Subscription>,
    torn_down: bool,
}

impl PortalSession {
    /// Session over `dataset`, validated on the way in.
    pub fn new(config: PortalConfig, dataset: Dataset) -> Result<Self, StoreError> {
        let store = DirectoryStore::new(dataset)?;
        Ok(Self::with_store(config, store))
    }

    /// Session seeded from `config.dataset_path`, or the mock data.
    pub fn from_config(config: PortalConfig) -> Result<Self, StoreError> {
        let store = match &config.dataset_path {
            Some(path) => DirectoryStore::load(path)?,
            None => DirectoryStore::with_mock_data(),
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: PortalConfig, store: DirectoryStore) -> Self {
        let tutor = Tutor::new(config.tutor_reply_delay_ms);
        info!(
            student = %store.dataset().student.name,
            unread_messages = store.unread_messages(),
            unread_notifications = store.unread_notifications(),
            "portal session started"
        );
        Self {
            config,
            store,
            tutor,
            subscriptions: Vec::new(),
            torn_down: false,
        }
    }

    /// Replace the tutor, e.g. with a seeded one for reproducible replies.
    pub fn set_tutor(&mut self, tutor: Tutor) {
        self.tutor.close();
        self.tutor = tutor;
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    pub fn state(&self) -> Snapshot {
        self.store.get_state()
    }

    /// Keep `listener` subscribed for as long as the session lives.
    pub fn watch(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        let sub = self.store.subscribe(listener);
        self.subscriptions.push(sub);
    }

    // ── Mutations ──────────────────────────────────────────────────

    pub fn open_message(&mut self, id: MessageId) -> MutationOutcome {
        self.store.mark_message_as_read(id)
    }

    pub fn read_notification(&mut self, id: NotificationId) -> MutationOutcome {
        self.store.mark_notification_as_read(id)
    }

    pub fn read_all_notifications(&mut self) -> MutationOutcome {
        self.store.mark_all_notifications_as_read()
    }

    // ── Pages ──────────────────────────────────────────────────────

    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        pages::dashboard(&self.state(), &self.config, today)
    }

    pub fn performance(&self) -> PerformanceReport {
        pages::performance(&self.state(), &self.config)
    }

    pub fn payments(&self, today: NaiveDate) -> PaymentsSummary {
        pages::payments(&self.state(), today)
    }

    pub fn notification_stats(&self, today: NaiveDate) -> NotificationStats {
        pages::notification_stats(&self.state(), today)
    }

    // ── Tutor ──────────────────────────────────────────────────────

    pub fn tutor(&self) -> &Tutor {
        &self.tutor
    }

    pub fn ask_tutor(&mut self, now: u64, question: &str, subject: Option<&str>) -> Option<TaskId> {
        self.tutor.ask(now, question, subject)
    }

    pub fn tick(&mut self, now: u64) -> usize {
        self.tutor.tick(now)
    }

    /// Weak subjects the tutor suggests focusing on.
    pub fn focus_subjects(&self) -> Vec<String> {
        focus_subjects(&self.state(), self.config.weak_subject_threshold)
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Cancel pending replies and detach every subscription. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let cancelled = self.tutor.close();
        let detached = self.subscriptions.len();
        self.subscriptions.clear();
        info!(cancelled, detached, "portal session torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for PortalSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use directory_store::seed::mock_dataset;

    use super::*;

    fn session() -> PortalSession {
        PortalSession::new(PortalConfig::default(), mock_dataset()).unwrap()
    }

    #[test]
    fn watchers_follow_mutations_until_teardown() {
        let mut s = session();
        let calls = Rc::new(Cell::new(0));
        let sink = calls.clone();
        s.watch(move |_| sink.set(sink.get() + 1));

        s.open_message(MessageId(1));
        assert_eq!(calls.get(), 1);
        assert_eq!(s.store().subscriber_count(), 1);

        s.teardown();
        assert_eq!(s.store().subscriber_count(), 0);
        s.open_message(MessageId(2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn teardown_cancels_tutor_replies() {
        let mut s = session();
        s.set_tutor(Tutor::seeded(1_000, 9));
        s.ask_tutor(0, "Como organizar o meu tempo de estudo?", None);
        assert!(s.tutor().is_typing());

        s.teardown();
        assert!(s.is_torn_down());
        assert_eq!(s.tick(5_000), 0);
        assert!(!s.tutor().is_typing());
        s.teardown();
    }

    #[test]
    fn from_config_uses_mock_without_path() {
        let s = PortalSession::from_config(PortalConfig::default()).unwrap();
        assert_eq!(s.state().unread_notifications, 5);
        assert_eq!(s.focus_subjects().len(), 3);
    }
}
