//! Invariant checks.
//!
//! Dataset checks run once, when a dataset enters a store, and return the
//! first hard violation. Soft findings (values the model expects but does
//! not enforce) are logged and never reject a dataset.
//!
//! `check_unread_counts` is the post-mutation check: it hard-fails, since a
//! mismatch can only come from a bug in the store itself.

use std::collections::BTreeSet;
use std::fmt::Display;

use thiserror::Error;
use tracing::warn;

use crate::domain::{Dataset, PaymentStatus, SubjectId};
use crate::state::Snapshot;

/// A rule the dataset breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[INVARIANT:{rule}] {detail}")]
pub struct InvariantViolation {
    pub rule: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    fn new(rule: &'static str, detail: impl Into<String>) -> Self {
        Self {
            rule,
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every hard dataset check; `Err` on the first failure. Soft findings
/// are logged as warnings.
pub fn validate_dataset(dataset: &Dataset) -> Result<(), InvariantViolation> {
    check_unique_ids(dataset)?;
    check_unique_subject_names(dataset)?;
    check_subject_refs(dataset)?;
    check_attendance_range(dataset)?;
    check_grade_scale(dataset)?;
    check_payment_amounts(dataset)?;

    for finding in soft_findings(dataset) {
        warn!(finding = %finding, "dataset soft invariant");
    }
    Ok(())
}

/// Expected-but-unenforced properties that do not hold.
pub fn soft_findings(dataset: &Dataset) -> Vec<String> {
    let mut findings = Vec::new();
    for g in &dataset.grades {
        if g.grade > g.max_grade {
            findings.push(format!(
                "grade {} scores {} above its maximum {}",
                g.id, g.grade, g.max_grade
            ));
        }
    }
    for p in &dataset.payments {
        if p.status == PaymentStatus::Paid && p.paid_date.is_none() {
            findings.push(format!("payment {} is paid but has no paid_date", p.id));
        }
    }
    findings
}

/// Derived unread counters must match the collections. Panics otherwise.
pub fn check_unread_counts(snapshot: &Snapshot) {
    let messages = snapshot.messages.iter().filter(|m| !m.read).count();
    if snapshot.unread_messages != messages {
        panic!(
            "Invariant violation: [INVARIANT:unread_messages] \
             snapshot reports {} unread messages, collection has {}",
            snapshot.unread_messages, messages
        );
    }
    let notifications = snapshot.notifications.iter().filter(|n| !n.read).count();
    if snapshot.unread_notifications != notifications {
        panic!(
            "Invariant violation: [INVARIANT:unread_notifications] \
             snapshot reports {} unread notifications, collection has {}",
            snapshot.unread_notifications, notifications
        );
    }
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn unique<T: Ord + Copy + Display>(
    collection: &'static str,
    ids: impl Iterator<Item = T>,
) -> Result<(), InvariantViolation> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(InvariantViolation::new(
                "duplicate_id",
                format!("{collection} id {id} appears more than once"),
            ));
        }
    }
    Ok(())
}

fn check_unique_ids(ds: &Dataset) -> Result<(), InvariantViolation> {
    unique("subject", ds.subjects.iter().map(|s| s.id))?;
    unique("grade", ds.grades.iter().map(|g| g.id))?;
    unique("event", ds.events.iter().map(|e| e.id))?;
    unique("payment", ds.payments.iter().map(|p| p.id))?;
    unique("message", ds.messages.iter().map(|m| m.id))?;
    unique("notification", ds.notifications.iter().map(|n| n.id))?;
    unique("resource", ds.resources.iter().map(|r| r.id))?;
    Ok(())
}

/// Name lookups stay unambiguous only while names are unique.
fn check_unique_subject_names(ds: &Dataset) -> Result<(), InvariantViolation> {
    let mut seen = BTreeSet::new();
    for s in &ds.subjects {
        if !seen.insert(s.name.as_str()) {
            return Err(InvariantViolation::new(
                "duplicate_subject_name",
                format!("subject name {:?} is used by more than one subject", s.name),
            ));
        }
    }
    Ok(())
}

fn check_subject_refs(ds: &Dataset) -> Result<(), InvariantViolation> {
    let known: BTreeSet<_> = ds.subjects.iter().map(|s| s.id).collect();
    let dangling = |owner: String, subject: SubjectId| {
        InvariantViolation::new(
            "subject_refs",
            format!("{owner} references unknown subject {subject}"),
        )
    };

    for g in &ds.grades {
        if !known.contains(&g.subject_id) {
            return Err(dangling(format!("grade {}", g.id), g.subject_id));
        }
    }
    for e in &ds.events {
        if let Some(sid) = e.subject_id {
            if !known.contains(&sid) {
                return Err(dangling(format!("event {}", e.id), sid));
            }
        }
    }
    for r in &ds.resources {
        if !known.contains(&r.subject_id) {
            return Err(dangling(format!("resource {}", r.id), r.subject_id));
        }
    }
    Ok(())
}

fn check_attendance_range(ds: &Dataset) -> Result<(), InvariantViolation> {
    for s in &ds.subjects {
        if !(0.0..=100.0).contains(&s.attendance) {
            return Err(InvariantViolation::new(
                "attendance_range",
                format!("subject {} attendance {} outside [0, 100]", s.id, s.attendance),
            ));
        }
    }
    Ok(())
}

fn check_grade_scale(ds: &Dataset) -> Result<(), InvariantViolation> {
    for g in &ds.grades {
        if g.max_grade.is_nan() || g.max_grade <= 0.0 || !g.grade.is_finite() || g.grade < 0.0 {
            return Err(InvariantViolation::new(
                "grade_scale",
                format!("grade {} has value {} of {}", g.id, g.grade, g.max_grade),
            ));
        }
    }
    Ok(())
}

fn check_payment_amounts(ds: &Dataset) -> Result<(), InvariantViolation> {
    for p in &ds.payments {
        if !p.amount.is_finite() || p.amount < 0.0 {
            return Err(InvariantViolation::new(
                "payment_amount",
                format!("payment {} has invalid amount {}", p.id, p.amount),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GradeId, MessageId};
    use crate::seed::mock_dataset;
    use crate::state::build_snapshot;

    #[test]
    fn test_duplicate_message_id_rejected() {
        let mut ds = mock_dataset();
        ds.messages[1].id = MessageId(1);
        let err = validate_dataset(&ds).unwrap_err();
        assert_eq!(err.rule, "duplicate_id");
        assert!(err.to_string().contains("message id 1"));
    }

    #[test]
    fn test_duplicate_subject_name_rejected() {
        let mut ds = mock_dataset();
        ds.subjects[1].name = ds.subjects[0].name.clone();
        assert_eq!(validate_dataset(&ds).unwrap_err().rule, "duplicate_subject_name");
    }

    #[test]
    fn test_dangling_event_subject_rejected() {
        let mut ds = mock_dataset();
        ds.events[0].subject_id = Some(SubjectId(77));
        assert_eq!(validate_dataset(&ds).unwrap_err().rule, "subject_refs");
    }

    #[test]
    fn test_attendance_out_of_range_rejected() {
        let mut ds = mock_dataset();
        ds.subjects[0].attendance = 101.0;
        assert_eq!(validate_dataset(&ds).unwrap_err().rule, "attendance_range");
    }

    #[test]
    fn test_zero_max_grade_rejected() {
        let mut ds = mock_dataset();
        ds.grades[0].max_grade = 0.0;
        assert_eq!(validate_dataset(&ds).unwrap_err().rule, "grade_scale");
    }

    #[test]
    fn test_grade_above_max_is_soft() {
        let mut ds = mock_dataset();
        ds.grades[0].grade = 21.0;
        assert!(validate_dataset(&ds).is_ok());
        let findings = soft_findings(&ds);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains(&GradeId(1).to_string()));
    }

    #[test]
    fn test_unread_counts_hold_for_fresh_snapshot() {
        check_unread_counts(&build_snapshot(&mock_dataset()));
    }

    #[test]
    #[should_panic(expected = "INVARIANT:unread_messages")]
    fn test_unread_count_drift_panics() {
        let mut snap = build_snapshot(&mock_dataset());
        snap.unread_messages += 1;
        check_unread_counts(&snap);
    }
}
