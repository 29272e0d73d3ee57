//! HTTP handlers for the bot runtime operations.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiError;
use crate::bot::BotId;
use crate::logs::LogSnapshot;
use crate::rules::Rule;
use crate::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Rule mutation body. Fields are optional so missing ones are reported
/// as rule errors instead of parse errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRequest {
    pub group_id: Option<String>,
    pub criterion: Option<String>,
    pub value: Option<String>,
}

impl From<RuleRequest> for Rule {
    fn from(req: RuleRequest) -> Self {
        Rule::new(
            req.group_id.unwrap_or_default(),
            req.criterion.unwrap_or_default(),
            req.value,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingRequest {
    pub logging_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub text: String,
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/bots - Running bots.
pub async fn list_bots(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "bots": state.registry.running_bots() }))
}

/// GET /api/bots/:bot_id
pub async fn bot_status(State(state): State<AppState>, Path(bot_id): Path<BotId>) -> Json<Value> {
    let running = state.registry.is_running(&bot_id);
    Json(json!({ "botId": bot_id, "running": running }))
}

/// POST /api/bots/:bot_id/start
pub async fn start_bot(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
    body: JsonBody<StartRequest>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let token = body.token.unwrap_or_default();

    let status = state.registry.start(&bot_id, &token).await?;
    Ok(Json(json!({ "status": status })))
}

/// POST /api/bots/:bot_id/stop
pub async fn stop_bot(State(state): State<AppState>, Path(bot_id): Path<BotId>) -> Json<Value> {
    let status = state.registry.stop(&bot_id).await;
    Json(json!({ "status": status }))
}

/// GET /api/bots/:bot_id/rules
pub async fn list_rules(State(state): State<AppState>, Path(bot_id): Path<BotId>) -> Json<Value> {
    Json(json!({ "rules": state.rules.list(&bot_id) }))
}

/// POST /api/bots/:bot_id/rules
pub async fn add_rule(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
    body: JsonBody<RuleRequest>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let rules = state.rules.add(&bot_id, body.into())?;
    Ok(Json(json!({ "rules": rules })))
}

/// DELETE /api/bots/:bot_id/rules
pub async fn remove_rule(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
    body: JsonBody<RuleRequest>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let rules = state.rules.remove(&bot_id, &body.into())?;
    Ok(Json(json!({ "rules": rules })))
}

/// GET /api/bots/:bot_id/logs
pub async fn get_logs(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
) -> Json<LogSnapshot> {
    Json(state.logs.snapshot(&bot_id))
}

/// DELETE /api/bots/:bot_id/logs
pub async fn clear_logs(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
) -> Json<LogSnapshot> {
    Json(state.logs.clear(&bot_id))
}

/// PATCH /api/bots/:bot_id/logging
pub async fn set_logging(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
    body: JsonBody<LoggingRequest>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let enabled = body
        .logging_enabled
        .ok_or_else(|| ApiError::BadRequest("loggingEnabled must be a boolean".into()))?;

    let enabled = state.logs.set_enabled(&bot_id, enabled);
    Ok(Json(json!({ "status": "logging toggled", "loggingEnabled": enabled })))
}

/// POST /api/bots/:bot_id/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(bot_id): Path<BotId>,
    body: JsonBody<SendMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    state
        .registry
        .send_message(&bot_id, &body.chat_id, &body.text)
        .await?;
    Ok(Json(json!({ "status": "sent" })))
}
