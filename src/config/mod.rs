//! Configuration module for the Botfly runtime.
//!
//! Loads configuration from environment variables (a `.env` file is
//! honored).

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use url::Url;

use crate::bot::BotId;
use crate::logs::LOG_CAPACITY;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BOT_ID: &str = "default";

/// A bot to start at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutostartBot {
    pub bot_id: BotId,
    pub token: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the HTTP control API.
    pub http_addr: SocketAddr,

    /// Entries retained per bot log.
    pub log_capacity: usize,

    /// Custom Telegram Bot API server (e.g. a local `telegram-bot-api`).
    pub telegram_api_url: Option<Url>,

    /// Bot from BOT_ID/BOT_TOKEN, started before the API comes up.
    pub autostart: Option<AutostartBot>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_addr: SocketAddr = var("BOTFLY_HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse()
            .context("BOTFLY_HTTP_ADDR must be a socket address like 0.0.0.0:8080")?;

        let log_capacity = match var("BOTFLY_LOG_CAPACITY") {
            Some(v) => v
                .parse::<usize>()
                .context("BOTFLY_LOG_CAPACITY must be a positive integer")?,
            None => LOG_CAPACITY,
        };
        if log_capacity == 0 {
            bail!("BOTFLY_LOG_CAPACITY must be a positive integer");
        }

        let telegram_api_url = var("TELEGRAM_API_URL")
            .map(|v| Url::parse(&v))
            .transpose()
            .context("Invalid TELEGRAM_API_URL format")?;

        let autostart = var("BOT_TOKEN").map(|token| AutostartBot {
            bot_id: BotId::from(var("BOT_ID").unwrap_or_else(|| DEFAULT_BOT_ID.to_string())),
            token,
        });

        Ok(Self {
            http_addr,
            log_capacity,
            telegram_api_url,
            autostart,
        })
    }
}
