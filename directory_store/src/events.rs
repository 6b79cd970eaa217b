//! Mutation definitions.
//!
//! Mutations are pure data. They carry intent only and contain no
//! transition logic. Applied mutations are journaled with a sequence
//! number so a store can be rebuilt by replay.

use serde::{Deserialize, Serialize};

use crate::domain::{MessageId, NotificationId};

/// Every state change the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Mutation {
    MarkMessageRead(MessageId),
    MarkNotificationRead(NotificationId),
    MarkAllNotificationsRead,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::MarkMessageRead(_) => "mark_message_read",
            Mutation::MarkNotificationRead(_) => "mark_notification_read",
            Mutation::MarkAllNotificationsRead => "mark_all_notifications_read",
        }
    }

    /// Raw id of the targeted entity; `None` for bulk mutations.
    pub fn target_id(&self) -> Option<u32> {
        match self {
            Mutation::MarkMessageRead(id) => Some(id.0),
            Mutation::MarkNotificationRead(id) => Some(id.0),
            Mutation::MarkAllNotificationsRead => None,
        }
    }
}

/// A mutation that changed state, stamped with its journal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Strictly increasing, starting at 1.
    pub sequence: u64,
    pub mutation: Mutation,
}

/// What a mutation did. Misses are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// State changed; `flipped` flags went from unread to read.
    Applied { flipped: usize },
    /// Target exists but was already read.
    AlreadyRead,
    /// No entity with that id.
    NotFound,
}

impl MutationOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id_names_the_entity() {
        assert_eq!(Mutation::MarkMessageRead(MessageId(4)).target_id(), Some(4));
        assert_eq!(
            Mutation::MarkNotificationRead(NotificationId(7)).target_id(),
            Some(7)
        );
        assert_eq!(Mutation::MarkAllNotificationsRead.target_id(), None);
    }
}
