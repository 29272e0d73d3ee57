//! Bot registry - lifecycle of live bot connections.
//!
//! At most one connection exists per bot id. Start, stop and send for the
//! same id run inside that id's slot lock; different ids never block each
//! other. Status queries read a separate set of live ids and never wait on a
//! slot lock.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::client::{ChatConnection, ChatConnector, InboundSink};
use super::dispatcher::MessageDispatcher;
use super::BotId;
use crate::error::{BotflyError, Result};
use crate::utils::mask_token;

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopStatus {
    Stopped,
    NotRunning,
}

type Slot = Arc<Mutex<Option<Box<dyn ChatConnection>>>>;

/// Maps bot ids to their live connection.
pub struct BotRegistry {
    connector: Arc<dyn ChatConnector>,
    dispatcher: Arc<MessageDispatcher>,
    slots: DashMap<BotId, Slot>,
    /// Ids with a stored connection, updated while holding the slot lock.
    live: DashSet<BotId>,
}

impl BotRegistry {
    pub fn new(connector: Arc<dyn ChatConnector>, dispatcher: Arc<MessageDispatcher>) -> Self {
        Self {
            connector,
            dispatcher,
            slots: DashMap::new(),
            live: DashSet::new(),
        }
    }

    /// Get or create the lock slot for a bot.
    fn slot(&self, bot_id: &BotId) -> Slot {
        self.slots.entry(bot_id.clone()).or_default().clone()
    }

    fn existing_slot(&self, bot_id: &BotId) -> Option<Slot> {
        self.slots.get(bot_id).map(|slot| slot.clone())
    }

    /// Connect a bot and attach the message dispatcher.
    ///
    /// Returns `AlreadyRunning` without reconnecting if the bot is live.
    /// A failed connection leaves nothing registered.
    pub async fn start(&self, bot_id: &BotId, token: &str) -> Result<StartStatus> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BotflyError::Config("bot token must not be empty".into()));
        }

        let slot = self.slot(bot_id);
        let mut connection = slot.lock().await;

        if connection.is_some() {
            info!("Bot {} is already running", bot_id);
            return Ok(StartStatus::AlreadyRunning);
        }

        info!("Starting bot {} with token {}", bot_id, mask_token(token));
        let sink = InboundSink::new(bot_id.clone(), self.dispatcher.clone());
        let conn = self.connector.connect(token, sink).await.inspect_err(|e| {
            warn!("Failed to start bot {}: {}", bot_id, e);
        })?;

        *connection = Some(conn);
        self.live.insert(bot_id.clone());
        info!("Bot {} started", bot_id);
        Ok(StartStatus::Started)
    }

    /// Stop a bot's connection. Rules, logs and the logging flag are kept.
    pub async fn stop(&self, bot_id: &BotId) -> StopStatus {
        let Some(slot) = self.existing_slot(bot_id) else {
            return StopStatus::NotRunning;
        };

        let mut connection = slot.lock().await;
        match connection.take() {
            Some(conn) => {
                self.live.remove(bot_id);
                conn.stop().await;
                info!("Bot {} stopped", bot_id);
                StopStatus::Stopped
            }
            None => StopStatus::NotRunning,
        }
    }

    /// A bot still connecting reports `false` until its start completes.
    pub fn is_running(&self, bot_id: &BotId) -> bool {
        self.live.contains(bot_id)
    }

    /// Ids of all bots with a live connection, sorted.
    pub fn running_bots(&self) -> Vec<BotId> {
        let mut running: Vec<BotId> = self.live.iter().map(|id| id.key().clone()).collect();
        running.sort();
        running
    }

    /// Send an arbitrary message through a running bot.
    pub async fn send_message(&self, bot_id: &BotId, chat_id: &str, text: &str) -> Result<()> {
        if chat_id.trim().is_empty() || text.is_empty() {
            return Err(BotflyError::Validation("chatId and text are required".into()));
        }

        let slot = self
            .existing_slot(bot_id)
            .ok_or_else(|| BotflyError::NotRunning(bot_id.clone()))?;
        let connection = slot.lock().await;
        let conn = connection
            .as_ref()
            .ok_or_else(|| BotflyError::NotRunning(bot_id.clone()))?;

        conn.reply(chat_id.trim(), text).await
    }

    /// Stop every running bot.
    pub async fn stop_all(&self) {
        let bots = self.running_bots();
        if bots.is_empty() {
            return;
        }

        info!("Stopping {} bot(s)...", bots.len());
        join_all(bots.iter().map(|bot_id| self.stop(bot_id))).await;
    }
}

impl std::fmt::Debug for BotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRegistry")
            .field("slots", &self.slots.len())
            .field("live", &self.live.len())
            .finish()
    }
}
