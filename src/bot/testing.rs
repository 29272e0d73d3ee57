//! In-memory chat platform for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::client::{ChatConnection, ChatConnector, InboundMessage, InboundSink, Replier};
use crate::error::{BotflyError, Result};

/// Records every reply; optionally fails the first `n` of them.
#[derive(Clone, Default)]
pub struct RecordingReplier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_remaining: Arc<AtomicUsize>,
}

impl RecordingReplier {
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_remaining: Arc::new(AtomicUsize::new(n)),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()> {
        let failing = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BotflyError::Send("simulated failure".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

struct FakeConnection {
    replier: RecordingReplier,
    live: Arc<AtomicUsize>,
}

#[async_trait]
impl Replier for FakeConnection {
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()> {
        self.replier.reply(chat_id, text).await
    }
}

#[async_trait]
impl ChatConnection for FakeConnection {
    async fn stop(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Connector that accepts any token except `"bad"` and lets tests push
/// messages into the most recently connected sink. The token `"hang"`
/// never finishes connecting.
#[derive(Clone, Default)]
pub struct FakeConnector {
    pub replier: RecordingReplier,
    live: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
    sinks: Arc<Mutex<Vec<InboundSink>>>,
}

impl FakeConnector {
    /// Connections currently open.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Successful connect calls so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Deliver a message as if the platform pushed it to `bot_id`.
    pub async fn push(&self, bot_id: &str, msg: InboundMessage) {
        let sink = self
            .sinks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.bot_id().as_str() == bot_id)
            .cloned()
            .expect("bot was never connected");
        sink.deliver(msg, &self.replier).await;
    }
}

#[async_trait]
impl ChatConnector for FakeConnector {
    async fn connect(&self, token: &str, sink: InboundSink) -> Result<Box<dyn ChatConnection>> {
        tokio::task::yield_now().await;
        if token == "hang" {
            return std::future::pending().await;
        }
        if token == "bad" {
            return Err(BotflyError::Connection("Unauthorized".into()));
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        self.sinks.lock().unwrap().push(sink);
        Ok(Box::new(FakeConnection {
            replier: self.replier.clone(),
            live: self.live.clone(),
        }))
    }
}
