//! Centralized transition logic.
//!
//! ALL dataset mutation lives here. Only `read` flags ever change, and
//! only from false to true. Lookups that miss return `NotFound` and leave
//! the dataset untouched.

use crate::domain::{Dataset, MessageId, NotificationId};
use crate::events::{Mutation, MutationOutcome};

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `mutation` to `dataset` in place and report what happened.
pub fn apply_mutation(dataset: &mut Dataset, mutation: &Mutation) -> MutationOutcome {
    match *mutation {
        Mutation::MarkMessageRead(id) => mark_message_read(dataset, id),
        Mutation::MarkNotificationRead(id) => mark_notification_read(dataset, id),
        Mutation::MarkAllNotificationsRead => mark_all_notifications_read(dataset),
    }
}

// ---------------------------------------------------------------------------
// Individual handlers (private)
// ---------------------------------------------------------------------------

fn mark_message_read(dataset: &mut Dataset, id: MessageId) -> MutationOutcome {
    match dataset.messages.iter_mut().find(|m| m.id == id) {
        None => MutationOutcome::NotFound,
        Some(message) if message.read => MutationOutcome::AlreadyRead,
        Some(message) => {
            message.read = true;
            MutationOutcome::Applied { flipped: 1 }
        }
    }
}

fn mark_notification_read(dataset: &mut Dataset, id: NotificationId) -> MutationOutcome {
    match dataset.notifications.iter_mut().find(|n| n.id == id) {
        None => MutationOutcome::NotFound,
        Some(notification) if notification.read => MutationOutcome::AlreadyRead,
        Some(notification) => {
            notification.read = true;
            MutationOutcome::Applied { flipped: 1 }
        }
    }
}

fn mark_all_notifications_read(dataset: &mut Dataset) -> MutationOutcome {
    let mut flipped = 0;
    for notification in dataset.notifications.iter_mut().filter(|n| !n.read) {
        notification.read = true;
        flipped += 1;
    }
    if flipped == 0 {
        MutationOutcome::AlreadyRead
    } else {
        MutationOutcome::Applied { flipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::mock_dataset;

    #[test]
    fn test_mark_message_read_flips_once() {
        let mut ds = mock_dataset();
        let id = ds.messages.iter().find(|m| !m.read).unwrap().id;

        let first = apply_mutation(&mut ds, &Mutation::MarkMessageRead(id));
        assert_eq!(first, MutationOutcome::Applied { flipped: 1 });

        let second = apply_mutation(&mut ds, &Mutation::MarkMessageRead(id));
        assert_eq!(second, MutationOutcome::AlreadyRead);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut ds = mock_dataset();
        let before = ds.clone();

        assert_eq!(
            apply_mutation(&mut ds, &Mutation::MarkMessageRead(MessageId(9_999))),
            MutationOutcome::NotFound
        );
        assert_eq!(
            apply_mutation(&mut ds, &Mutation::MarkNotificationRead(NotificationId(9_999))),
            MutationOutcome::NotFound
        );
        assert_eq!(ds, before);
    }

    #[test]
    fn test_mark_all_counts_flips() {
        let mut ds = mock_dataset();
        let unread = ds.unread_notifications();
        assert!(unread > 0);

        let outcome = apply_mutation(&mut ds, &Mutation::MarkAllNotificationsRead);
        assert_eq!(outcome, MutationOutcome::Applied { flipped: unread });
        assert_eq!(ds.unread_notifications(), 0);

        let again = apply_mutation(&mut ds, &Mutation::MarkAllNotificationsRead);
        assert_eq!(again, MutationOutcome::AlreadyRead);
    }

    #[test]
    fn test_only_read_flags_change() {
        let mut ds = mock_dataset();
        let id = ds.messages.iter().find(|m| !m.read).unwrap().id;
        let before = ds.clone();

        apply_mutation(&mut ds, &Mutation::MarkMessageRead(id));

        assert_eq!(ds.subjects, before.subjects);
        assert_eq!(ds.grades, before.grades);
        assert_eq!(ds.payments, before.payments);
        assert_eq!(ds.notifications, before.notifications);
        let changed: Vec<_> = ds
            .messages
            .iter()
            .zip(&before.messages)
            .filter(|(a, b)| a != b)
            .map(|(a, _)| a.id)
            .collect();
        assert_eq!(changed, vec![id]);
    }
}
