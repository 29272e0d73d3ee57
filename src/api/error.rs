//! API error type mapping runtime errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::BotflyError;

/// Error returned by API handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Error from the bot runtime.
    Runtime(BotflyError),
    /// Body that could not be parsed.
    BadRequest(String),
}

impl From<BotflyError> for ApiError {
    fn from(e: BotflyError) -> Self {
        ApiError::Runtime(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Runtime(
                BotflyError::Config(_) | BotflyError::InvalidRule(_) | BotflyError::Validation(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::Runtime(BotflyError::NotRunning(_)) => StatusCode::CONFLICT,
            ApiError::Runtime(BotflyError::Connection(_) | BotflyError::Send(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Runtime(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
