//! In-memory message log for the active session

use chrono::Utc;

use super::{Message, MessageId, Role};

/// Greeting seeded into a fresh conversation
pub const DEFAULT_GREETING: &str = "Hello! 👋 Lucky is here. How can I help you today?";

/// Ordered log of the active session's messages
///
/// Append-only, except for regeneration which strips trailing assistant
/// turns. Insertion order is meaningful: it is the literal prompt history
/// sent to the completion backends. Nothing is persisted past the session.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with an assistant greeting
    #[must_use]
    pub fn with_greeting(greeting: &str) -> Self {
        let mut conversation = Self::new();
        conversation.push(Role::Assistant, greeting.to_string());
        conversation
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) -> Message {
        self.push(Role::User, content.into())
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, content: impl Into<String>) -> Message {
        self.push(Role::Assistant, content.into())
    }

    fn push(&mut self, role: Role, content: String) -> Message {
        let message = Message {
            id: MessageId(self.next_id),
            role,
            content,
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Remove trailing assistant turns, stopping at the nearest user turn
    ///
    /// Returns how many messages were removed. Never deletes past the
    /// closest preceding user message.
    pub fn truncate_trailing_assistant(&mut self) -> usize {
        let mut removed = 0;
        while self.messages.last().is_some_and(Message::is_assistant) {
            self.messages.pop();
            removed += 1;
        }
        removed
    }

    /// Most recent user-authored turn, scanning from the end
    #[must_use]
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Clear the log and reseed the greeting; the id sequence restarts
    pub fn reset(&mut self, greeting: &str) {
        self.messages.clear();
        self.next_id = 0;
        self.push(Role::Assistant, greeting.to_string());
    }

    /// The ordered message log
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the log
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_from_creation_order() {
        let mut conversation = Conversation::new();
        let a = conversation.push_user("one");
        let b = conversation.push_assistant("two");
        let c = conversation.push_user("three");

        assert_eq!(a.id, MessageId(0));
        assert_eq!(b.id, MessageId(1));
        assert_eq!(c.id, MessageId(2));
    }

    #[test]
    fn greeting_seeds_a_single_assistant_turn() {
        let conversation = Conversation::with_greeting(DEFAULT_GREETING);

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::Assistant);
        assert_eq!(conversation.messages()[0].content, DEFAULT_GREETING);
    }

    #[test]
    fn truncation_stops_at_nearest_user_turn() {
        let mut conversation = Conversation::new();
        conversation.push_user("A");
        conversation.push_assistant("B");
        conversation.push_assistant("C");

        let removed = conversation.truncate_trailing_assistant();

        assert_eq!(removed, 2);
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].content, "A");
    }

    #[test]
    fn truncation_is_a_noop_after_a_user_turn() {
        let mut conversation = Conversation::new();
        conversation.push_assistant("greeting");
        conversation.push_user("question");

        assert_eq!(conversation.truncate_trailing_assistant(), 0);
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn truncation_on_empty_log_removes_nothing() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.truncate_trailing_assistant(), 0);
        assert!(conversation.is_empty());
    }

    #[test]
    fn last_user_message_scans_from_the_end() {
        let mut conversation = Conversation::new();
        conversation.push_user("first");
        conversation.push_assistant("reply");
        conversation.push_user("second");
        conversation.push_assistant("reply again");

        let last = conversation.last_user_message().expect("user turn exists");
        assert_eq!(last.content, "second");
    }

    #[test]
    fn last_user_message_is_none_without_user_turns() {
        let conversation = Conversation::with_greeting(DEFAULT_GREETING);
        assert!(conversation.last_user_message().is_none());
    }

    #[test]
    fn reset_restarts_the_id_sequence() {
        let mut conversation = Conversation::new();
        conversation.push_user("one");
        conversation.push_assistant("two");

        conversation.reset("fresh start");

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].id, MessageId(0));
        assert_eq!(conversation.messages()[0].content, "fresh start");
    }
}
