//! View-level filters over a snapshot.
//!
//! Pure functions: the store exposes raw collections, pages narrow them
//! down here. Free-text search is a case-insensitive substring match; an
//! empty term matches everything.

use chrono::NaiveDate;

use directory_store::domain::{
    Event, Grade, Message, Notification, NotificationKind, Payment, PaymentStatus, Resource,
};
use directory_store::Snapshot;

/// Case-insensitive substring test. Empty or blank `term` matches.
pub fn matches_search(haystack: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || haystack.to_lowercase().contains(&term.to_lowercase())
}

fn any_matches(fields: &[&str], term: &str) -> bool {
    term.trim().is_empty() || fields.iter().any(|f| matches_search(f, term))
}

// ── Grades ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeFilter {
    /// Subject display name; `None` for all subjects.
    pub subject: Option<String>,
    pub period: Option<String>,
}

/// Grades matching the filter, newest first. A subject name that matches
/// no subject yields nothing.
pub fn filter_grades<'a>(snapshot: &'a Snapshot, filter: &GradeFilter) -> Vec<&'a Grade> {
    let subject_id = match &filter.subject {
        None => None,
        Some(name) => match snapshot.subject_by_name(name) {
            Some(subject) => Some(subject.id),
            None => return Vec::new(),
        },
    };

    let mut grades: Vec<&Grade> = snapshot
        .grades
        .iter()
        .filter(|g| subject_id.map_or(true, |id| g.subject_id == id))
        .filter(|g| filter.period.as_ref().map_or(true, |p| &g.period == p))
        .collect();
    grades.sort_by(|a, b| b.date.cmp(&a.date));
    grades
}

/// Distinct grade periods, in first-seen order.
pub fn periods(snapshot: &Snapshot) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for g in &snapshot.grades {
        if !out.contains(&g.period.as_str()) {
            out.push(&g.period);
        }
    }
    out
}

// ── Messages ───────────────────────────────────────────────────────

/// Messages whose title, sender or body contain `term`.
pub fn search_messages<'a>(snapshot: &'a Snapshot, term: &str) -> Vec<&'a Message> {
    snapshot
        .messages
        .iter()
        .filter(|m| any_matches(&[m.subject.as_str(), m.sender.as_str(), m.content.as_str()], term))
        .collect()
}

// ── Payments ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub search: String,
    /// Stored status to match; `None` for all.
    pub status: Option<PaymentStatus>,
}

pub fn filter_payments<'a>(snapshot: &'a Snapshot, filter: &PaymentFilter) -> Vec<&'a Payment> {
    snapshot
        .payments
        .iter()
        .filter(|p| matches_search(&p.description, &filter.search))
        .filter(|p| filter.status.map_or(true, |s| p.status == s))
        .collect()
}

// ── Notifications ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    All,
    Read,
    Unread,
}

impl ReadFilter {
    fn admits(self, read: bool) -> bool {
        match self {
            ReadFilter::All => true,
            ReadFilter::Read => read,
            ReadFilter::Unread => !read,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub search: String,
    pub kind: Option<NotificationKind>,
    pub read: ReadFilter,
}

pub fn filter_notifications<'a>(
    snapshot: &'a Snapshot,
    filter: &NotificationFilter,
) -> Vec<&'a Notification> {
    snapshot
        .notifications
        .iter()
        .filter(|n| any_matches(&[n.title.as_str(), n.message.as_str()], &filter.search))
        .filter(|n| filter.kind.map_or(true, |k| n.kind == k))
        .filter(|n| filter.read.admits(n.read))
        .collect()
}

// ── Calendar and resources ─────────────────────────────────────────

/// Events strictly after `today`, soonest first, at most `limit`.
pub fn upcoming_events(snapshot: &Snapshot, today: NaiveDate, limit: usize) -> Vec<&Event> {
    let mut events: Vec<&Event> = snapshot.events.iter().filter(|e| e.date > today).collect();
    events.sort_by_key(|e| (e.date, e.time));
    events.truncate(limit);
    events
}

/// Every event in calendar order.
pub fn calendar(snapshot: &Snapshot) -> Vec<&Event> {
    let mut events: Vec<&Event> = snapshot.events.iter().collect();
    events.sort_by_key(|e| (e.date, e.time));
    events
}

/// Resources for a subject name, or all of them. Unknown names yield nothing.
pub fn resources_for<'a>(snapshot: &'a Snapshot, subject: Option<&str>) -> Vec<&'a Resource> {
    match subject {
        None => snapshot.resources.iter().collect(),
        Some(name) => match snapshot.subject_by_name(name) {
            Some(s) => snapshot
                .resources
                .iter()
                .filter(|r| r.subject_id == s.id)
                .collect(),
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use directory_store::domain::{MessageId, NotificationId, PaymentId};
    use directory_store::DirectoryStore;

    use super::*;

    fn snap() -> Snapshot {
        DirectoryStore::with_mock_data().get_state()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search("Propina de Janeiro", "JANEIRO"));
        assert!(matches_search("anything", "   "));
        assert!(!matches_search("Propina", "taxa"));
    }

    #[test]
    fn grades_filtered_by_subject_and_sorted_newest_first() {
        let s = snap();
        let filter = GradeFilter {
            subject: Some("Matemática".to_string()),
            period: None,
        };
        let grades = filter_grades(&s, &filter);
        assert_eq!(grades.len(), 3);
        assert!(grades.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn grades_filtered_by_period() {
        let s = snap();
        let filter = GradeFilter {
            subject: None,
            period: Some("1º Período".to_string()),
        };
        assert_eq!(filter_grades(&s, &filter).len(), 3);
        assert_eq!(periods(&s), vec!["2º Período", "1º Período"]);
    }

    #[test]
    fn unknown_subject_matches_nothing() {
        let s = snap();
        let filter = GradeFilter {
            subject: Some("Astrologia".to_string()),
            period: None,
        };
        assert!(filter_grades(&s, &filter).is_empty());
        assert!(resources_for(&s, Some("Astrologia")).is_empty());
    }

    #[test]
    fn message_search_covers_sender_and_body() {
        let s = snap();
        let by_sender: Vec<_> = search_messages(&s, "maria").iter().map(|m| m.id).collect();
        assert_eq!(by_sender, vec![MessageId(3)]);
        let by_body: Vec<_> = search_messages(&s, "estatística").iter().map(|m| m.id).collect();
        assert_eq!(by_body, vec![MessageId(1)]);
        assert_eq!(search_messages(&s, "").len(), s.messages.len());
    }

    #[test]
    fn payments_by_search_and_status() {
        let s = snap();
        let filter = PaymentFilter {
            search: "propina".to_string(),
            status: Some(PaymentStatus::Pending),
        };
        let ids: Vec<_> = filter_payments(&s, &filter).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PaymentId(2)]);
    }

    #[test]
    fn notifications_by_kind_and_read_state() {
        let s = snap();
        let filter = NotificationFilter {
            search: String::new(),
            kind: Some(NotificationKind::Warning),
            read: ReadFilter::Unread,
        };
        let ids: Vec<_> = filter_notifications(&s, &filter).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NotificationId(2), NotificationId(7)]);

        let read = NotificationFilter {
            read: ReadFilter::Read,
            ..NotificationFilter::default()
        };
        assert_eq!(filter_notifications(&s, &read).len(), 3);
    }

    #[test]
    fn upcoming_events_are_future_and_limited() {
        let s = snap();
        let events = upcoming_events(&s, day(2024, 1, 26), 3);
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Teste de Física",
                "Feira de Ciências",
                "Entrega do Projeto de Matemática"
            ]
        );
    }

    #[test]
    fn resources_by_subject() {
        let s = snap();
        let physics = resources_for(&s, Some("Física"));
        assert_eq!(physics.len(), 1);
        assert_eq!(resources_for(&s, None).len(), 4);
    }
}
