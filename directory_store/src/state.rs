//! Snapshot construction.
//!
//! A snapshot is the read-only view handed to consumers. Unread counts are
//! derived here from the collections, every time, and never stored on
//! their own.

use serde::Serialize;

use crate::domain::*;

/// Full read-only view of the store at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Journal position this snapshot reflects; 0 before any mutation.
    pub sequence: u64,
    pub student: Student,
    pub subjects: Vec<Subject>,
    pub grades: Vec<Grade>,
    pub events: Vec<Event>,
    pub payments: Vec<Payment>,
    pub messages: Vec<Message>,
    pub notifications: Vec<Notification>,
    pub resources: Vec<Resource>,
    pub unread_messages: usize,
    pub unread_notifications: usize,
}

impl Snapshot {
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn notification(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }
}

/// Build a snapshot at sequence 0.
pub fn build_snapshot(dataset: &Dataset) -> Snapshot {
    build_snapshot_at(dataset, 0)
}

/// Build a snapshot, recomputing the derived counters from scratch.
pub fn build_snapshot_at(dataset: &Dataset, sequence: u64) -> Snapshot {
    Snapshot {
        sequence,
        student: dataset.student.clone(),
        subjects: dataset.subjects.clone(),
        grades: dataset.grades.clone(),
        events: dataset.events.clone(),
        payments: dataset.payments.clone(),
        messages: dataset.messages.clone(),
        notifications: dataset.notifications.clone(),
        resources: dataset.resources.clone(),
        unread_messages: dataset.unread_messages(),
        unread_notifications: dataset.unread_notifications(),
    }
}
