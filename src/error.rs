//! Error types for the bot runtime.

use thiserror::Error;

use crate::bot::BotId;

/// Errors returned synchronously by runtime operations.
///
/// Failures inside the per-message dispatch path never surface here; they
/// are logged and swallowed at the dispatch boundary.
#[derive(Debug, Error)]
pub enum BotflyError {
    /// Missing or empty configuration (e.g. an empty bot token).
    #[error("configuration error: {0}")]
    Config(String),

    /// The chat platform refused or could not establish a connection.
    #[error("failed to connect bot: {0}")]
    Connection(String),

    /// Rule mutation request without a group id or criterion.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Malformed request outside the rule store.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Operation requires a live connection but the bot is stopped.
    #[error("bot {0} is not running")]
    NotRunning(BotId),

    /// The chat platform rejected an explicit send.
    #[error("failed to send message: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, BotflyError>;
