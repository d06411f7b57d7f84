use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ResolveError;

/// Error returned by every handler, rendered as `{ ok: false, message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let (status, message) = match err {
            ResolveError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ResolveError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ResolveError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream service failed".to_string(),
                )
            }
            ResolveError::Unavailable(msg) => {
                tracing::warn!("Unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
            }
            ResolveError::Stream(msg) => {
                tracing::error!("Stream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Proxy download failed".to_string())
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "ok": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
