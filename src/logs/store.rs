//! Per-bot bounded message log.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::BotId;

/// Default number of entries retained per bot.
pub const LOG_CAPACITY: usize = 1000;

/// One recorded inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// When the message was received.
    pub date: DateTime<Utc>,
    /// Sender display name.
    pub user: String,
    pub user_id: Option<u64>,
    pub chat_id: String,
    /// Only set for group chats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_title: Option<String>,
    pub text: String,
}

/// Retained logs plus the logging flag, as returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSnapshot {
    /// Oldest first.
    pub logs: Vec<LogEntry>,
    pub logging_enabled: bool,
}

#[derive(Debug, Default)]
struct BotLog {
    enabled: bool,
    entries: VecDeque<LogEntry>,
}

/// Circular log buffers keyed by bot, each gated by a logging flag.
///
/// Cloning is cheap and shares the same underlying map.
#[derive(Clone)]
pub struct LogStore {
    logs: Arc<DashMap<BotId, BotLog>>,
    capacity: usize,
}

impl LogStore {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// Create a store retaining at most `capacity` entries per bot.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Turn logging on or off for a bot. Past entries are untouched.
    pub fn set_enabled(&self, bot_id: &BotId, enabled: bool) -> bool {
        self.logs.entry(bot_id.clone()).or_default().enabled = enabled;
        debug!("Logging for bot {} set to {}", bot_id, enabled);
        enabled
    }

    /// Whether logging is on for a bot (off for unknown bots).
    pub fn is_enabled(&self, bot_id: &BotId) -> bool {
        self.logs.get(bot_id).is_some_and(|log| log.enabled)
    }

    /// Append an entry, evicting the oldest ones past capacity.
    ///
    /// Does nothing when logging is off. Returns whether the entry was kept.
    pub fn append(&self, bot_id: &BotId, entry: LogEntry) -> bool {
        let Some(mut log) = self.logs.get_mut(bot_id) else {
            return false;
        };
        if !log.enabled {
            return false;
        }

        log.entries.push_back(entry);
        while log.entries.len() > self.capacity {
            log.entries.pop_front();
        }
        true
    }

    /// Retained entries (oldest first) and the current flag.
    pub fn snapshot(&self, bot_id: &BotId) -> LogSnapshot {
        match self.logs.get(bot_id) {
            Some(log) => LogSnapshot {
                logs: log.entries.iter().cloned().collect(),
                logging_enabled: log.enabled,
            },
            None => LogSnapshot {
                logs: Vec::new(),
                logging_enabled: false,
            },
        }
    }

    /// Drop retained entries, keeping the flag.
    pub fn clear(&self, bot_id: &BotId) -> LogSnapshot {
        if let Some(mut log) = self.logs.get_mut(bot_id) {
            log.entries.clear();
        }
        self.snapshot(bot_id)
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("bots", &self.logs.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> LogEntry {
        LogEntry {
            date: Utc::now(),
            user: "alice".to_string(),
            user_id: Some(7),
            chat_id: "g1".to_string(),
            chat_title: Some("Group".to_string()),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_logging_is_off_by_default() {
        let store = LogStore::new();
        let bot = BotId::from("b1");

        assert!(!store.is_enabled(&bot));
        assert!(!store.append(&bot, entry("hi")));

        let snapshot = store.snapshot(&bot);
        assert!(snapshot.logs.is_empty());
        assert!(!snapshot.logging_enabled);
    }

    #[test]
    fn test_append_when_enabled() {
        let store = LogStore::new();
        let bot = BotId::from("b1");
        store.set_enabled(&bot, true);

        assert!(store.append(&bot, entry("first")));
        assert!(store.append(&bot, entry("second")));

        let snapshot = store.snapshot(&bot);
        assert!(snapshot.logging_enabled);
        let texts: Vec<_> = snapshot.logs.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let store = LogStore::new();
        let bot = BotId::from("b1");
        store.set_enabled(&bot, true);

        for i in 0..=LOG_CAPACITY {
            store.append(&bot, entry(&i.to_string()));
        }

        let logs = store.snapshot(&bot).logs;
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs.first().map(|e| e.text.as_str()), Some("1"));
        assert_eq!(
            logs.last().map(|e| e.text.clone()),
            Some(LOG_CAPACITY.to_string())
        );
    }

    #[test]
    fn test_disable_is_not_retroactive() {
        let store = LogStore::new();
        let bot = BotId::from("b1");
        store.set_enabled(&bot, true);
        store.append(&bot, entry("kept"));

        store.set_enabled(&bot, false);
        assert!(!store.append(&bot, entry("dropped")));

        let snapshot = store.snapshot(&bot);
        assert!(!snapshot.logging_enabled);
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.logs[0].text, "kept");
    }

    #[test]
    fn test_clear_keeps_flag() {
        let store = LogStore::with_capacity(5);
        let bot = BotId::from("b1");
        store.set_enabled(&bot, true);
        store.append(&bot, entry("a"));

        let snapshot = store.clear(&bot);
        assert!(snapshot.logs.is_empty());
        assert!(snapshot.logging_enabled);
    }

    #[test]
    fn test_entry_json_shape() {
        let mut e = entry("hello");
        e.chat_title = None;
        let json = serde_json::to_value(&e).unwrap();

        assert_eq!(json["user"], "alice");
        assert_eq!(json["userId"], 7);
        assert_eq!(json["chatId"], "g1");
        assert_eq!(json["text"], "hello");
        assert!(json.get("chatTitle").is_none());
    }
}
