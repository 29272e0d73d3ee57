//! Shared application state.
//!
//! Built once at startup and handed to the HTTP layer; tests build a fresh
//! one per case.

use std::sync::Arc;

use crate::bot::{BotRegistry, ChatConnector, MessageDispatcher};
use crate::logs::LogStore;
use crate::rules::RuleStore;

#[derive(Clone)]
pub struct AppState {
    /// Live bot connections.
    pub registry: Arc<BotRegistry>,

    /// Moderation rules per bot.
    pub rules: RuleStore,

    /// Message logs per bot.
    pub logs: LogStore,
}

impl AppState {
    /// Wire the stores, the dispatcher and the registry together.
    pub fn new(connector: Arc<dyn ChatConnector>, log_capacity: usize) -> Self {
        let rules = RuleStore::new();
        let logs = LogStore::with_capacity(log_capacity);
        let dispatcher = Arc::new(MessageDispatcher::new(rules.clone(), logs.clone()));
        let registry = Arc::new(BotRegistry::new(connector, dispatcher));

        Self {
            registry,
            rules,
            logs,
        }
    }
}
