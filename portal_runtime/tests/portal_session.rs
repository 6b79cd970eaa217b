//! Integration tests for portal_runtime.
//!
//! Sessions are built from the mock dataset unless a test writes its own
//! files into a temporary directory.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use chrono::NaiveDate;

use directory_store::domain::{MessageId, NotificationId};
use directory_store::seed::mock_dataset;
use directory_store::{DirectoryStore, Mutation};

use portal_runtime::config::PortalConfig;
use portal_runtime::drift::compare_snapshots;
use portal_runtime::replay;
use portal_runtime::session::PortalSession;
use portal_runtime::snapshot::{capture, verify_snapshot_hash};
use portal_runtime::tutor::Tutor;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mock_session() -> PortalSession {
    PortalSession::new(PortalConfig::default(), mock_dataset()).unwrap()
}

// ─────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────

#[test]
fn replay_reproduces_live_hash() {
    let mut store = DirectoryStore::with_mock_data();
    store.mark_message_as_read(MessageId(1));
    store.mark_notification_as_read(NotificationId(3));
    store.mark_notification_as_read(NotificationId(3));
    store.mark_all_notifications_as_read();

    let (snap, hash) = replay::rebuild_snapshot(&mock_dataset(), store.journal()).unwrap();
    assert_eq!(hash, store.current_hash());
    assert_eq!(snap.unread_notifications, 0);
    assert_eq!(snap.unread_messages, 1);
    replay::verify_determinism(&mock_dataset(), store.journal()).unwrap();
}

#[test]
fn empty_journal_rebuilds_seed_state() {
    let hash = replay::rebuild_hash(&mock_dataset(), &[]).unwrap();
    assert_eq!(hash, DirectoryStore::with_mock_data().current_hash());
}

#[test]
fn journal_survives_json_round_trip() {
    let mut store = DirectoryStore::with_mock_data();
    store.apply(Mutation::MarkMessageRead(MessageId(2)));
    store.apply(Mutation::MarkAllNotificationsRead);

    let json = serde_json::to_string(store.journal()).unwrap();
    let journal: Vec<directory_store::JournalEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(journal.as_slice(), store.journal());
    assert_eq!(
        replay::rebuild_hash(&mock_dataset(), &journal).unwrap(),
        store.current_hash()
    );
}

// ─────────────────────────────────────────────────────────────
// Snapshot records and drift
// ─────────────────────────────────────────────────────────────

#[test]
fn snapshot_record_verifies_and_detects_tampering() {
    let mut session = mock_session();
    session.open_message(MessageId(1));
    let mut record = capture(&session.state());

    assert_eq!(record.sequence, 1);
    assert!(verify_snapshot_hash(&record));
    assert_eq!(record.hash, session.store().current_hash());

    record.canonical_json = record.canonical_json.replace("\"read\":false", "\"read\":true");
    assert!(!verify_snapshot_hash(&record));
}

#[test]
fn capture_is_stable_for_equal_states() {
    let a = capture(&DirectoryStore::with_mock_data().get_state());
    let b = capture(&DirectoryStore::with_mock_data().get_state());
    assert_eq!(a, b);
}

#[test]
fn drift_between_sessions_lists_read_ids() {
    let untouched = mock_session();
    let mut busy = mock_session();
    busy.read_notification(NotificationId(5));
    busy.open_message(MessageId(9));

    let report = compare_snapshots(&untouched.state(), &busy.state());
    assert_eq!(report.newly_read_notifications, vec![NotificationId(5)]);
    assert!(report.newly_read_messages.is_empty());
    assert_eq!(report.unread_notifications_delta, -1);
    assert!(!report.is_identical());
}

// ─────────────────────────────────────────────────────────────
// Session lifecycle
// ─────────────────────────────────────────────────────────────

#[test]
fn sessions_are_isolated() {
    let mut a = mock_session();
    let b = mock_session();
    a.read_all_notifications();
    assert_eq!(a.state().unread_notifications, 0);
    assert_eq!(b.state().unread_notifications, 5);
}

#[test]
fn watcher_sees_badge_updates() {
    let mut session = mock_session();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    session.watch(move |snap| sink.borrow_mut().push(snap.unread_messages));

    session.open_message(MessageId(1));
    session.open_message(MessageId(1));
    session.open_message(MessageId(2));
    assert_eq!(*seen.borrow(), vec![1, 0]);
}

#[test]
fn pending_reply_never_lands_after_teardown() {
    let mut session = mock_session();
    session.set_tutor(Tutor::seeded(2_000, 42));
    session
        .ask_tutor(0, "Como melhorar em Física?", Some("Física"))
        .unwrap();
    assert_eq!(session.tutor().next_reply_due(), Some(2_000));

    session.teardown();
    assert_eq!(session.tick(10_000), 0);
    assert_eq!(session.tutor().conversation().len(), 2);
    assert!(session.ask_tutor(10_000, "Ainda aí?", None).is_none());
}

#[test]
fn tutor_reply_is_delivered_on_time() {
    let mut session = mock_session();
    session.set_tutor(Tutor::seeded(1_500, 5));
    session.ask_tutor(500, "Dicas para Química", Some("Química"));
    assert_eq!(session.tick(1_999), 0);
    assert_eq!(session.tick(2_000), 1);
    assert!(!session.tutor().is_typing());
}

#[test]
fn teardown_releases_listener_captures() {
    let mut session = mock_session();
    let probe = Rc::new(());
    let held = probe.clone();
    session.watch(move |_| {
        let _ = &held;
    });
    assert_eq!(Rc::strong_count(&probe), 2);

    session.teardown();
    assert_eq!(session.store().subscriber_count(), 0);
    assert_eq!(Rc::strong_count(&probe), 1);
}

// ─────────────────────────────────────────────────────────────
// Pages through the session
// ─────────────────────────────────────────────────────────────

#[test]
fn dashboard_reflects_mutations() {
    let mut session = mock_session();
    let today = day(2024, 1, 25);
    assert_eq!(session.dashboard(today).unread_messages, 2);
    session.open_message(MessageId(2));
    let d = session.dashboard(today);
    assert_eq!(d.unread_messages, 1);
    assert_eq!(d.upcoming_events.len(), 3);
}

#[test]
fn performance_and_payments_pages() {
    let session = mock_session();
    let report = session.performance();
    assert_eq!(report.ranking.len(), 7);
    assert_eq!(report.ranking[0].name, "Inglês");

    let pay = session.payments(day(2024, 2, 15));
    assert_eq!(pay.total_pending, 215.0);
    assert_eq!(pay.overdue.len(), 3);
}

// ─────────────────────────────────────────────────────────────
// Files on disk
// ─────────────────────────────────────────────────────────────

#[test]
fn session_loads_dataset_named_in_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = mock_dataset();
    for n in &mut ds.notifications {
        n.read = true;
    }
    let data_path = dir.path().join("dataset.json");
    fs::write(&data_path, serde_json::to_string_pretty(&ds).unwrap()).unwrap();

    let config_path = dir.path().join("portal.toml");
    fs::write(
        &config_path,
        format!(
            "dataset_path = {:?}\nrecent_messages_limit = 1\n",
            data_path.display().to_string()
        ),
    )
    .unwrap();

    let config = PortalConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.recent_messages_limit, 1);
    let session = PortalSession::from_config(config).unwrap();
    assert_eq!(session.state().unread_notifications, 0);
    assert_eq!(session.dashboard(day(2024, 1, 25)).recent_messages.len(), 1);
}

#[test]
fn invalid_dataset_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = mock_dataset();
    ds.subjects[0].attendance = 140.0;
    let data_path = dir.path().join("bad.json");
    fs::write(&data_path, serde_json::to_string(&ds).unwrap()).unwrap();

    let config = PortalConfig {
        dataset_path: Some(data_path),
        ..PortalConfig::default()
    };
    let err = PortalSession::from_config(config).err().unwrap();
    assert!(err.to_string().contains("attendance_range"));
}
