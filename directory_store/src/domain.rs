//! Core domain types for the student directory.
//!
//! Pure data. Mutation lives in `transitions`, derived values in `metrics`.
//! Cross-collection references use typed ids, never display names.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ── Identifiers ────────────────────────────────────────────────────

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(StudentId);
id_newtype!(SubjectId);
id_newtype!(GradeId);
id_newtype!(MessageId);
id_newtype!(EventId);
id_newtype!(PaymentId);
id_newtype!(NotificationId);
id_newtype!(ResourceId);

// ── Enumerations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeKind {
    Test,
    Exam,
    Assignment,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Teacher,
    Parent,
    School,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Exam,
    Event,
    Meeting,
    Deadline,
    Holiday,
}

/// Stored payment status. `Overdue` exists in the data model but no
/// mutation path assigns it; see `metrics::is_overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Tuition,
    Fee,
    Material,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Academic,
    Event,
    Message,
    Financial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pdf,
    Video,
    Link,
    Game,
}

// ── Entities ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub class: String,
    pub year: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub enrollment_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub teacher: String,
    pub teacher_id: String,
    pub code: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub current_grade: f64,
    /// Percentage in [0, 100].
    pub attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grade {
    pub id: GradeId,
    pub subject_id: SubjectId,
    pub grade: f64,
    pub max_grade: f64,
    pub kind: GradeKind,
    pub date: NaiveDate,
    pub teacher: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub id: MessageId,
    pub sender: String,
    pub sender_type: SenderType,
    /// Title line of the message, not a school subject.
    pub subject: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub read: bool,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub kind: EventKind,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    pub id: PaymentId,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub category: Option<NotificationCategory>,
    pub date: NaiveDateTime,
    pub read: bool,
    #[serde(default)]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub kind: ResourceKind,
    pub subject_id: SubjectId,
    pub url: String,
    pub description: String,
    pub upload_date: NaiveDate,
}

// ── Dataset ────────────────────────────────────────────────────────

/// The full seeded dataset owned by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    pub student: Student,
    pub subjects: Vec<Subject>,
    pub grades: Vec<Grade>,
    pub events: Vec<Event>,
    pub payments: Vec<Payment>,
    pub messages: Vec<Message>,
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Dataset {
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Resolve a subject by display name. Exact, case-sensitive match.
    /// Only for inputs that arrive as names (filters, CLI flags).
    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn grades_for(&self, subject_id: SubjectId) -> impl Iterator<Item = &Grade> {
        self.grades.iter().filter(move |g| g.subject_id == subject_id)
    }

    pub fn unread_messages(&self) -> usize {
        self.messages.iter().filter(|m| !m.read).count()
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}
