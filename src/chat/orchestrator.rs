//! Completion orchestration over the provider fallback chain

use crate::chat::{Conversation, Message};
use crate::providers::ProviderChain;
use crate::{Error, Result};

/// Reply appended when every completion backend fails
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble connecting right now. \
     Please try again in a moment.";

/// Answers user turns through the fixed-order provider chain
///
/// Owns the only write path into a [`Conversation`]: every send or
/// regeneration appends exactly one assistant turn, falling back to an
/// apologetic placeholder when the whole chain is exhausted. The caller
/// never learns which backend served a request.
pub struct ChatOrchestrator {
    chain: ProviderChain,
}

impl ChatOrchestrator {
    /// Create an orchestrator over an ordered provider chain
    #[must_use]
    pub const fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    /// Append a user turn and obtain an assistant reply
    ///
    /// Backends are tried strictly in declared order; intermediate failures
    /// are logged and never surfaced. Total failure appends [`FALLBACK_REPLY`]
    /// instead of propagating an error, so the session always gets a response.
    pub async fn send(&self, conversation: &mut Conversation, content: &str) -> Message {
        let history = conversation.messages().to_vec();
        conversation.push_user(content);
        self.reply(conversation, content, &history).await
    }

    /// Drop trailing assistant replies and answer the last user turn again
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRegenerate`] when the conversation holds no
    /// user turn; the conversation is left untouched in that case.
    pub async fn regenerate(&self, conversation: &mut Conversation) -> Result<Message> {
        if conversation.last_user_message().is_none() {
            return Err(Error::NothingToRegenerate);
        }

        let removed = conversation.truncate_trailing_assistant();
        tracing::debug!(removed, "dropped trailing assistant replies");

        // After truncation the log is guaranteed to end with the user turn
        // being answered; everything before it is the prompt history.
        let messages = conversation.messages();
        let split = messages.len() - 1;
        let content = messages[split].content.clone();
        let history = messages[..split].to_vec();

        Ok(self.reply(conversation, &content, &history).await)
    }

    async fn reply(
        &self,
        conversation: &mut Conversation,
        content: &str,
        history: &[Message],
    ) -> Message {
        match self.chain.complete(content, history).await {
            Ok(text) => conversation.push_assistant(text),
            Err(e) => {
                tracing::error!(error = %e, "all completion providers failed");
                conversation.push_assistant(FALLBACK_REPLY)
            }
        }
    }
}
