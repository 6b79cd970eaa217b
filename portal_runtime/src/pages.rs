//! Page summaries.
//!
//! Each portal page reduces to a plain struct computed from one snapshot.
//! Nothing here keeps state between calls.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use directory_store::domain::{Event, Message, Notification, NotificationKind, Payment, PaymentStatus};
use directory_store::metrics::{
    effective_status, mean_grade, overall_average, overdue_payments, subject_average,
    subject_performance, target_average, total_by_status, SubjectPerformance, SubjectStanding,
};
use directory_store::Snapshot;

use crate::config::PortalConfig;
use crate::query::{filter_grades, upcoming_events, GradeFilter};

// ── Dashboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub student_name: String,
    /// Mean over every grade; 0.0 with no grades.
    pub average_grade: f64,
    pub subject_count: usize,
    pub upcoming_events: Vec<Event>,
    pub unread_messages: usize,
    pub recent_messages: Vec<Message>,
    pub pending_payments: Vec<Payment>,
}

pub fn dashboard(snapshot: &Snapshot, config: &PortalConfig, today: NaiveDate) -> DashboardSummary {
    DashboardSummary {
        student_name: snapshot.student.name.clone(),
        average_grade: mean_grade(&snapshot.grades),
        subject_count: snapshot.subjects.len(),
        upcoming_events: upcoming_events(snapshot, today, config.upcoming_events_limit)
            .into_iter()
            .cloned()
            .collect(),
        unread_messages: snapshot.unread_messages,
        recent_messages: snapshot
            .messages
            .iter()
            .take(config.recent_messages_limit)
            .cloned()
            .collect(),
        pending_payments: snapshot
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .cloned()
            .collect(),
    }
}

// ── Sidebar ────────────────────────────────────────────────────────

/// Badge counts shown next to navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidebarBadges {
    pub messages: usize,
    pub notifications: usize,
}

pub fn sidebar_badges(snapshot: &Snapshot) -> SidebarBadges {
    SidebarBadges {
        messages: snapshot.unread_messages,
        notifications: snapshot.unread_notifications,
    }
}

// ── Grades ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SubjectAverage {
    pub name: String,
    pub average: f64,
    pub grade_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradesSummary {
    pub filtered_count: usize,
    pub filtered_average: f64,
    pub subject_count: usize,
    /// Filtered grades dated in the same month as `today`.
    pub this_month: usize,
    pub per_subject: Vec<SubjectAverage>,
}

pub fn grades(snapshot: &Snapshot, filter: &GradeFilter, today: NaiveDate) -> GradesSummary {
    let filtered = filter_grades(snapshot, filter);
    let this_month = filtered
        .iter()
        .filter(|g| g.date.year() == today.year() && g.date.month() == today.month())
        .count();
    GradesSummary {
        filtered_count: filtered.len(),
        filtered_average: mean_grade(filtered.iter().copied()),
        subject_count: snapshot.subjects.len(),
        this_month,
        per_subject: snapshot
            .subjects
            .iter()
            .map(|s| SubjectAverage {
                name: s.name.clone(),
                average: subject_average(&snapshot.grades, s.id),
                grade_count: snapshot.grades.iter().filter(|g| g.subject_id == s.id).count(),
            })
            .collect(),
    }
}

// ── Performance ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    /// Best average first.
    pub ranking: Vec<SubjectPerformance>,
    pub overall_average: f64,
    pub best: Option<SubjectPerformance>,
    pub weakest: Option<SubjectPerformance>,
    pub excellent: Vec<SubjectPerformance>,
    pub needs_improvement: Vec<SubjectPerformance>,
    /// Next goal, never above the grading scale.
    pub target_average: f64,
}

pub fn performance(snapshot: &Snapshot, config: &PortalConfig) -> PerformanceReport {
    let threshold = config.weak_subject_threshold;
    let ranking = subject_performance(&snapshot.subjects, &snapshot.grades, threshold);
    let overall = overall_average(&ranking);
    let (excellent, needs_improvement): (Vec<_>, Vec<_>) = ranking
        .iter()
        .cloned()
        .partition(|p| p.standing == SubjectStanding::Excellent);

    PerformanceReport {
        best: ranking.first().cloned(),
        weakest: ranking.last().cloned(),
        overall_average: overall,
        target_average: target_average(overall, threshold).min(config.grade_scale_max),
        excellent,
        needs_improvement,
        ranking,
    }
}

// ── Payments ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment: Payment,
    pub display_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentsSummary {
    pub total_pending: f64,
    pub total_paid: f64,
    pub overdue: Vec<Payment>,
    pub count: usize,
    pub rows: Vec<PaymentRow>,
}

pub fn payments(snapshot: &Snapshot, today: NaiveDate) -> PaymentsSummary {
    PaymentsSummary {
        total_pending: total_by_status(&snapshot.payments, PaymentStatus::Pending),
        total_paid: total_by_status(&snapshot.payments, PaymentStatus::Paid),
        overdue: overdue_payments(&snapshot.payments, today)
            .into_iter()
            .cloned()
            .collect(),
        count: snapshot.payments.len(),
        rows: snapshot
            .payments
            .iter()
            .map(|p| PaymentRow {
                payment: p.clone(),
                display_status: effective_status(p, today),
            })
            .collect(),
    }
}

// ── Notifications ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub today: usize,
    /// Warnings and errors together.
    pub important: usize,
}

pub fn notification_stats(snapshot: &Snapshot, today: NaiveDate) -> NotificationStats {
    let all: &[Notification] = &snapshot.notifications;
    NotificationStats {
        total: all.len(),
        unread: snapshot.unread_notifications,
        today: all.iter().filter(|n| n.date.date() == today).count(),
        important: all
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::Warning | NotificationKind::Error))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use directory_store::DirectoryStore;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dashboard_uses_configured_limits() {
        let snap = DirectoryStore::with_mock_data().get_state();
        let config = PortalConfig {
            upcoming_events_limit: 2,
            recent_messages_limit: 1,
            ..PortalConfig::default()
        };
        let d = dashboard(&snap, &config, day(2024, 1, 25));
        assert_eq!(d.upcoming_events.len(), 2);
        assert_eq!(d.recent_messages.len(), 1);
        assert_eq!(d.pending_payments.len(), 3);
        assert_eq!(d.unread_messages, 2);
        assert_eq!(d.subject_count, 7);
        let expected = snap.grades.iter().map(|g| g.grade).sum::<f64>() / snap.grades.len() as f64;
        assert!((d.average_grade - expected).abs() < 1e-9);
    }

    #[test]
    fn grades_summary_counts_this_month() {
        let snap = DirectoryStore::with_mock_data().get_state();
        let g = grades(&snap, &GradeFilter::default(), day(2024, 1, 25));
        assert_eq!(g.filtered_count, 11);
        assert_eq!(g.this_month, 8);
        let pe = g.per_subject.iter().find(|s| s.name == "Educação Física").unwrap();
        assert_eq!(pe.average, 0.0);
        assert_eq!(pe.grade_count, 0);
    }

    #[test]
    fn performance_splits_on_threshold() {
        let snap = DirectoryStore::with_mock_data().get_state();
        let report = performance(&snap, &PortalConfig::default());
        assert_eq!(report.best.as_ref().unwrap().name, "Inglês");
        assert_eq!(report.weakest.as_ref().unwrap().name, "Educação Física");
        assert_eq!(report.excellent.len(), 4);
        assert_eq!(report.needs_improvement.len(), 3);
        assert!(report.target_average >= 14.0);
    }

    #[test]
    fn target_is_capped_by_grade_scale() {
        let snap = DirectoryStore::with_mock_data().get_state();
        let config = PortalConfig {
            weak_subject_threshold: 10.0,
            grade_scale_max: 12.0,
            ..PortalConfig::default()
        };
        assert_eq!(performance(&snap, &config).target_average, 12.0);
        assert_eq!(
            performance(&snap, &PortalConfig::default()).target_average,
            14.0
        );
    }

    #[test]
    fn payments_summary_flags_overdue() {
        let snap = DirectoryStore::with_mock_data().get_state();
        let p = payments(&snap, day(2024, 1, 25));
        assert_eq!(p.total_pending, 215.0);
        assert_eq!(p.total_paid, 210.0);
        assert_eq!(p.overdue.len(), 1);
        let overdue_rows = p
            .rows
            .iter()
            .filter(|r| r.display_status == PaymentStatus::Overdue)
            .count();
        assert_eq!(overdue_rows, 1);
    }

    #[test]
    fn notification_stats_follow_mutations() {
        let mut store = DirectoryStore::with_mock_data();
        let before = notification_stats(&store.get_state(), day(2024, 1, 24));
        assert_eq!(before.total, 8);
        assert_eq!(before.unread, 5);
        assert_eq!(before.today, 2);
        assert_eq!(before.important, 2);

        store.mark_all_notifications_as_read();
        let after = notification_stats(&store.get_state(), day(2024, 1, 24));
        assert_eq!(after.unread, 0);
        assert_eq!(sidebar_badges(&store.get_state()).notifications, 0);
    }
}
