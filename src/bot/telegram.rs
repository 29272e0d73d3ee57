//! Telegram connector built on teloxide.
//!
//! Each started bot gets its own throttled `Bot` and its own dispatcher
//! task. Updates for one bot are handled one at a time; different bots run
//! concurrently.

use async_trait::async_trait;
use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::dispatching::{ShutdownToken, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use super::client::{ChatConnection, ChatConnector, InboundMessage, InboundSink, Replier};
use crate::error::{BotflyError, Result};

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Connects bots to the Telegram Bot API with long polling.
#[derive(Debug, Clone, Default)]
pub struct TelegramConnector {
    /// Custom Bot API server, if any.
    api_url: Option<Url>,
}

impl TelegramConnector {
    pub fn new(api_url: Option<Url>) -> Self {
        Self { api_url }
    }
}

#[async_trait]
impl ChatConnector for TelegramConnector {
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn ChatConnection>> {
        let mut bot = Bot::new(token);
        if let Some(url) = &self.api_url {
            bot = bot.set_api_url(url.clone());
        }

        // getMe fails fast on a bad token or an unreachable API.
        let me = bot
            .get_me()
            .await
            .map_err(|e| BotflyError::Connection(e.to_string()))?;
        info!("Bot {} authenticated as @{}", sink.bot_id(), me.username());

        // Respects Telegram's rate limits per bot:
        // - 30 messages per second globally
        // - 1 message per second to the same chat
        // - 20 messages per minute to the same group
        let bot = bot.throttle(Limits::default());

        let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
            .dependencies(dptree::deps![sink])
            .distribution_function(|_| Some(()))
            .default_handler(|_| async {})
            .error_handler(LoggingErrorHandler::with_custom_text(
                "Error in bot message handler",
            ))
            .build();

        let shutdown = dispatcher.shutdown_token();
        let handle = tokio::spawn(async move {
            dispatcher.dispatch().await;
        });

        Ok(Box::new(TelegramConnection {
            bot,
            shutdown,
            handle: Mutex::new(Some(handle)),
        }))
    }
}

/// Build the handler schema: text messages only.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    Update::filter_message().endpoint(on_message)
}

async fn on_message(bot: ThrottledBot, msg: Message, sink: InboundSink) -> anyhow::Result<()> {
    let Some(inbound) = inbound_message(&msg) else {
        return Ok(());
    };

    let outcome = sink.deliver(inbound, &TelegramReplier { bot }).await;
    debug!("Bot {} handled message {}: {:?}", sink.bot_id(), msg.id.0, outcome);
    Ok(())
}

/// Convert a teloxide message, ignoring anything without text.
fn inbound_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    let from = msg.from.as_ref();

    let chat_title = if msg.chat.is_group() || msg.chat.is_supergroup() {
        msg.chat.title().map(str::to_string)
    } else {
        None
    };

    Some(InboundMessage {
        chat_id: msg.chat.id.to_string(),
        chat_title,
        sender_id: from.map(|u| u.id.0),
        sender_username: from.and_then(|u| u.username.clone()),
        sender_first_name: from.map(|u| u.first_name.clone()),
        text: text.to_string(),
    })
}

/// Resolve a chat id string: numeric ids or `@channel` usernames.
fn recipient(chat_id: &str) -> Result<Recipient> {
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(BotflyError::Validation(format!("invalid chat id: {}", chat_id)))
}

struct TelegramReplier {
    bot: ThrottledBot,
}

#[async_trait]
impl Replier for TelegramReplier {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()> {
        self.bot
            .send_message(recipient(chat_id)?, text)
            .await
            .map_err(|e| BotflyError::Send(e.to_string()))?;
        Ok(())
    }
}

/// A running teloxide dispatcher for one bot.
struct TelegramConnection {
    bot: ThrottledBot,
    shutdown: ShutdownToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl Replier for TelegramConnection {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()> {
        TelegramReplier {
            bot: self.bot.clone(),
        }
        .reply(chat_id, text)
        .await
    }
}

#[async_trait]
impl ChatConnection for TelegramConnection {
    async fn stop(&self) {
        match self.shutdown.shutdown() {
            Ok(done) => done.await,
            // Not dispatching yet, or already finished.
            Err(_) => debug!("Dispatcher idle, aborting task"),
        }

        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}
