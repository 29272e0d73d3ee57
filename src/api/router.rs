//! Axum router for the control API.
//!
//! All bot routes are under `/api/`.

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/bots", get(handlers::list_bots))
        .route("/bots/:bot_id", get(handlers::bot_status))
        .route("/bots/:bot_id/start", post(handlers::start_bot))
        .route("/bots/:bot_id/stop", post(handlers::stop_bot))
        .route(
            "/bots/:bot_id/rules",
            get(handlers::list_rules)
                .post(handlers::add_rule)
                .delete(handlers::remove_rule),
        )
        .route(
            "/bots/:bot_id/logs",
            get(handlers::get_logs).delete(handlers::clear_logs),
        )
        .route("/bots/:bot_id/logging", patch(handlers::set_logging))
        .route("/bots/:bot_id/messages", post(handlers::send_message));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
