//! Error taxonomy for HTTP handlers.
//!
//! Every failure is translated here into a status code and a JSON body of
//! the form `{error, message, details, timestamp}`; nothing propagates past
//! the handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use songbook_db::entities::FieldError;
use songbook_db::StoreError;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more body fields violate their constraints (400)
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    /// Body is not JSON, has the wrong content type, or a field has the wrong type (400)
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Path id is not a non-negative integer (400)
    #[error("Invalid song id '{0}': expected a non-negative integer")]
    MalformedId(String),

    #[error("Song with id '{0}' not found")]
    NotFound(u64),

    #[error("Endpoint '{path}' not found")]
    UnknownRoute {
        method: String,
        path: String,
        available: serde_json::Value,
    },

    /// Document unreadable or unwritable (500)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) | ApiError::MalformedId(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) | ApiError::UnknownRoute { .. } => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => "VALIDATION_ERROR",
            ApiError::MalformedId(_) => "MALFORMED_ID",
            ApiError::NotFound(_) | ApiError::UnknownRoute { .. } => "NOT_FOUND",
            ApiError::Store(e) if e.is_read() => "DATABASE_READ_ERROR",
            ApiError::Store(_) => "DATABASE_WRITE_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation(errors) => Some(json!({ "errors": errors })),
            ApiError::InvalidBody(reason) => Some(json!({ "reason": reason })),
            ApiError::MalformedId(raw) => Some(json!({ "id": raw })),
            ApiError::NotFound(id) => Some(json!({ "resource": "Song", "id": id })),
            ApiError::UnknownRoute {
                method,
                path,
                available,
            } => Some(json!({
                "path": path,
                "method": method,
                "available_endpoints": available,
            })),
            ApiError::Store(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            // Paths and OS errors stay in the logs.
            ApiError::Store(e) if e.is_read() => "Failed to read song database".to_string(),
            ApiError::Store(_) => "Failed to write song database".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), status = status.as_u16(), "{}", self);
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.message(),
            details: self.details(),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn read_error() -> StoreError {
        StoreError::Read {
            path: PathBuf::from("/secret/db.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
    }

    #[tokio::test]
    async fn test_validation_lists_every_field() {
        let errors = serde_json::from_str::<songbook_db::entities::SongCreate>("{}")
            .unwrap()
            .validate()
            .unwrap_err();
        let (status, json) = body_json(ApiError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"].as_array().unwrap().len(), 2);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let (status, json) = body_json(ApiError::NotFound(999)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Song with id '999' not found");
        assert_eq!(json["details"]["id"], 999);
    }

    #[tokio::test]
    async fn test_malformed_id() {
        let (status, json) = body_json(ApiError::MalformedId("abc".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "MALFORMED_ID");
    }

    #[tokio::test]
    async fn test_store_error_hides_path() {
        let (status, json) = body_json(ApiError::Store(read_error())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "DATABASE_READ_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("/secret"));
        assert!(json["details"].is_null());
    }

    #[test]
    fn test_write_error_code() {
        let err = ApiError::Store(StoreError::Write {
            path: PathBuf::from("db.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert_eq!(err.code(), "DATABASE_WRITE_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_store_error() {
        let err: ApiError = read_error().into();
        assert!(matches!(err, ApiError::Store(_)));
    }
}
