pub mod basic;
pub mod health;
pub mod songs;
pub mod stats;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

/// Song id taken from the `{id}` path segment.
///
/// Anything that is not a non-negative integer is rejected with
/// `MALFORMED_ID` before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongId(pub u64);

impl<S> FromRequestParts<S> for SongId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::MalformedId(e.body_text()))?;

        raw.trim()
            .parse::<u64>()
            .map(SongId)
            .map_err(|_| ApiError::MalformedId(raw))
    }
}

/// `Json<T>` whose rejections become `VALIDATION_ERROR` bodies instead of
/// axum's plain-text responses.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::InvalidBody(rejection.body_text())),
        }
    }
}

/// Envelope used by the versioned delete and health endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            ..Self::new(message, data)
        }
    }
}

/// Route listing returned with unknown-route 404s.
pub fn available_endpoints(prefix: &str) -> serde_json::Value {
    json!({
        "GET": [
            "/",
            "/songs",
            "/songs/{id}",
            format!("{prefix}/songs"),
            format!("{prefix}/songs/{{id}}"),
            format!("{prefix}/stats"),
            format!("{prefix}/health"),
        ],
        "POST": ["/songs", format!("{prefix}/songs")],
        "PUT": ["/songs/{id}", format!("{prefix}/songs/{{id}}")],
        "DELETE": ["/songs/{id}", format!("{prefix}/songs/{{id}}")],
    })
}
