//! Chat platform seam.
//!
//! The registry and dispatcher only talk to the platform through these
//! traits. `telegram` provides the real implementation; tests use an
//! in-memory one.

use std::sync::Arc;

use async_trait::async_trait;

use super::dispatcher::{DispatchOutcome, MessageDispatcher};
use super::BotId;
use crate::error::Result;

/// Inbound text message, already stripped of platform types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat id in the platform's native string form.
    pub chat_id: String,
    /// Only set for group chats.
    pub chat_title: Option<String>,
    pub sender_id: Option<u64>,
    pub sender_username: Option<String>,
    pub sender_first_name: Option<String>,
    pub text: String,
}

impl InboundMessage {
    /// Sender handle, falling back to the first name, then "unknown".
    pub fn display_name(&self) -> &str {
        self.sender_username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.sender_first_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("unknown")
    }
}

/// Sends text to a chat.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// A live connection for one bot.
#[async_trait]
pub trait ChatConnection: Replier {
    /// Stop receiving events. Must be safe to call once the connection
    /// has already ended on its own.
    async fn stop(&self);
}

/// Establishes connections from bot tokens.
#[async_trait]
pub trait ChatConnector: Send + Sync {
    /// Connect with `token` and push every inbound text message to `sink`.
    ///
    /// Fails with [`BotflyError::Connection`](crate::error::BotflyError::Connection)
    /// when the platform rejects the token or is unreachable.
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn ChatConnection>>;
}

/// Where a connection delivers inbound messages for one bot.
#[derive(Clone)]
pub struct InboundSink {
    bot_id: BotId,
    dispatcher: Arc<MessageDispatcher>,
}

impl InboundSink {
    pub fn new(bot_id: BotId, dispatcher: Arc<MessageDispatcher>) -> Self {
        Self { bot_id, dispatcher }
    }

    pub fn bot_id(&self) -> &BotId {
        &self.bot_id
    }

    /// Run the dispatcher for one message. Never fails.
    pub async fn deliver(&self, msg: InboundMessage, replier: &dyn Replier) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.bot_id, &msg, replier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(username: Option<&str>, first_name: Option<&str>) -> InboundMessage {
        InboundMessage {
            chat_id: "1".into(),
            chat_title: None,
            sender_id: Some(1),
            sender_username: username.map(Into::into),
            sender_first_name: first_name.map(Into::into),
            text: "hi".into(),
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(message(Some("alice"), Some("Alice")).display_name(), "alice");
        assert_eq!(message(None, Some("Alice")).display_name(), "Alice");
        assert_eq!(message(Some(""), Some("Alice")).display_name(), "Alice");
        assert_eq!(message(None, None).display_name(), "unknown");
    }
}
