//! Conversation state and completion orchestration
//!
//! Holds the in-memory message log for the active session and the
//! orchestrator that answers user turns through the provider fallback chain.

mod conversation;
mod orchestrator;

pub use conversation::{Conversation, DEFAULT_GREETING};
pub use orchestrator::{ChatOrchestrator, FALLBACK_REPLY};

use chrono::{DateTime, Utc};

/// Message identifier, monotonically assigned from creation order
///
/// Unique within a session; restarts when the conversation is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Authored by the person using the assistant
    User,
    /// Authored by a completion backend (or the gateway itself)
    Assistant,
}

impl Role {
    /// Role name in the shape every completion backend accepts
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn in the conversation. Immutable once created.
#[derive(Debug, Clone)]
pub struct Message {
    /// Session-unique identifier
    pub id: MessageId,
    /// Who authored the turn
    pub role: Role,
    /// Turn text
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether this turn was authored by the assistant
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
