//! Bot module - Bot runtime core.
//!
//! - `client` - Chat platform traits and inbound message type
//! - `dispatcher` - Per-message logging and rule matching
//! - `registry` - Start/stop lifecycle, one live connection per bot
//! - `telegram` - teloxide implementation of the chat platform

pub mod client;
pub mod dispatcher;
pub mod registry;
pub mod telegram;

#[cfg(test)]
pub mod testing;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use client::ChatConnector;
pub use dispatcher::MessageDispatcher;
pub use registry::BotRegistry;
pub use telegram::TelegramConnector;

/// Opaque bot identifier; the key for all per-bot state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(String);

impl BotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BotId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BotId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
