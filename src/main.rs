//! Botfly - Bot runtime service
//!
//! Runs Telegram bots on behalf of the Botfly dashboard: starts and stops
//! bot connections, logs inbound messages and answers group messages that
//! match moderation rules.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `bot` - Bot registry, message dispatcher, Telegram connector
//! - `rules` - Moderation rules and criteria
//! - `logs` - Per-bot bounded message logs
//! - `api` - HTTP control API (axum)
//! - `utils` - Utility functions

mod api;
mod bot;
mod config;
mod error;
mod logs;
mod rules;
mod state;
mod utils;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bot::TelegramConnector;
use config::Config;
use state::AppState;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("botfly=info,teloxide=warn,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Botfly runtime...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    if let Some(url) = &config.telegram_api_url {
        info!("Using Telegram Bot API at {}", url);
    }

    let connector = Arc::new(TelegramConnector::new(config.telegram_api_url.clone()));
    let state = AppState::new(connector, config.log_capacity);
    info!("Bot registry initialized (log capacity {})", state.logs.capacity());

    if let Some(autostart) = &config.autostart {
        match state.registry.start(&autostart.bot_id, &autostart.token).await {
            Ok(status) => info!("Autostart bot {}: {:?}", autostart.bot_id, status),
            Err(e) => error!("Autostart bot {} failed: {}", autostart.bot_id, e),
        }
    }

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!("HTTP API listening on {}", config.http_addr);

    axum::serve(listener, api::build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.registry.stop_all().await;
    info!("Botfly stopped");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
