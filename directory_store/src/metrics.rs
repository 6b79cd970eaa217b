//! Derived academic and financial metrics.
//!
//! Every value here is computed from the stored collections on demand.
//! Averages over an empty set are 0.0, never NaN.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Grade, Payment, PaymentStatus, Subject, SubjectId};

/// Averages below this flag a subject as needing improvement (0-20 scale).
pub const WEAK_SUBJECT_THRESHOLD: f64 = 14.0;

/// Top of the grading scale the thresholds assume.
pub const GRADE_SCALE_MAX: f64 = 20.0;

// ---------------------------------------------------------------------------
// Averages
// ---------------------------------------------------------------------------

/// Arithmetic mean of the grade values; 0.0 when there are none.
pub fn mean_grade<'a>(grades: impl IntoIterator<Item = &'a Grade>) -> f64 {
    let (sum, count) = grades
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), g| (sum + g.grade, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean of every grade recorded for `subject_id`; 0.0 if none exist.
pub fn subject_average(grades: &[Grade], subject_id: SubjectId) -> f64 {
    mean_grade(grades.iter().filter(|g| g.subject_id == subject_id))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStanding {
    Excellent,
    NeedsImprovement,
}

pub fn classify_subject(average: f64, threshold: f64) -> SubjectStanding {
    if average >= threshold {
        SubjectStanding::Excellent
    } else {
        SubjectStanding::NeedsImprovement
    }
}

/// Score as a percentage of its maximum.
pub fn grade_percentage(grade: &Grade) -> f64 {
    grade.grade / grade.max_grade * 100.0
}

/// Colour band of a single grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Excellent,
    Good,
    Sufficient,
    Insufficient,
}

impl GradeBand {
    pub fn of(grade: &Grade) -> Self {
        let pct = grade_percentage(grade);
        if pct >= 90.0 {
            GradeBand::Excellent
        } else if pct >= 70.0 {
            GradeBand::Good
        } else if pct >= 50.0 {
            GradeBand::Sufficient
        } else {
            GradeBand::Insufficient
        }
    }
}

// ---------------------------------------------------------------------------
// Per-subject performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Steady,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectPerformance {
    pub subject_id: SubjectId,
    pub name: String,
    pub average: f64,
    pub total_grades: usize,
    /// Most recent grade by date; 0.0 when there are none.
    pub last_grade: f64,
    pub trend: Trend,
    pub standing: SubjectStanding,
}

/// Latest grade against the mean of everything before it.
fn trend_of(chronological: &[&Grade]) -> Trend {
    let Some((last, earlier)) = chronological.split_last() else {
        return Trend::Steady;
    };
    if earlier.is_empty() {
        return Trend::Steady;
    }
    let before = mean_grade(earlier.iter().copied());
    match last.grade.partial_cmp(&before) {
        Some(Ordering::Greater) => Trend::Up,
        Some(Ordering::Less) => Trend::Down,
        _ => Trend::Steady,
    }
}

/// One row per subject, best average first. Ties keep subject order.
pub fn subject_performance(
    subjects: &[Subject],
    grades: &[Grade],
    threshold: f64,
) -> Vec<SubjectPerformance> {
    let mut rows: Vec<SubjectPerformance> = subjects
        .iter()
        .map(|subject| {
            let mut own: Vec<&Grade> =
                grades.iter().filter(|g| g.subject_id == subject.id).collect();
            own.sort_by_key(|g| g.date);
            let average = mean_grade(own.iter().copied());
            SubjectPerformance {
                subject_id: subject.id,
                name: subject.name.clone(),
                average,
                total_grades: own.len(),
                last_grade: own.last().map(|g| g.grade).unwrap_or(0.0),
                trend: trend_of(&own),
                standing: classify_subject(average, threshold),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.average.total_cmp(&a.average));
    rows
}

/// Mean of the per-subject averages; 0.0 for no subjects.
pub fn overall_average(performance: &[SubjectPerformance]) -> f64 {
    if performance.is_empty() {
        return 0.0;
    }
    performance.iter().map(|p| p.average).sum::<f64>() / performance.len() as f64
}

/// Subjects below the threshold, weakest first.
pub fn weak_subjects(performance: &[SubjectPerformance], threshold: f64) -> Vec<SubjectPerformance> {
    let mut weak: Vec<_> = performance
        .iter()
        .filter(|p| p.average < threshold)
        .cloned()
        .collect();
    weak.sort_by(|a, b| a.average.total_cmp(&b.average));
    weak
}

/// Recommended overall average to aim for, as a whole number.
pub fn target_average(overall: f64, threshold: f64) -> f64 {
    threshold.max(overall + 1.0).round()
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Pending and past due. A paid payment is never overdue, whatever its date.
pub fn is_overdue(payment: &Payment, today: NaiveDate) -> bool {
    payment.status == PaymentStatus::Pending && payment.due_date < today
}

/// Status to display: live overdue detection layered over the stored value.
pub fn effective_status(payment: &Payment, today: NaiveDate) -> PaymentStatus {
    match payment.status {
        PaymentStatus::Pending if is_overdue(payment, today) => PaymentStatus::Overdue,
        stored => stored,
    }
}

/// Sum of amounts carrying the given stored status.
pub fn total_by_status(payments: &[Payment], status: PaymentStatus) -> f64 {
    payments
        .iter()
        .filter(|p| p.status == status)
        .map(|p| p.amount)
        .sum()
}

pub fn overdue_payments(payments: &[Payment], today: NaiveDate) -> Vec<&Payment> {
    payments.iter().filter(|p| is_overdue(p, today)).collect()
}
