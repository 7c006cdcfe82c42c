use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use songbook_db::{AppState, Stats};

use super::SuccessResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /
pub async fn welcome(State(state): State<Arc<AppState>>) -> String {
    format!("Welcome to {} v{}", state.app_name, state.version)
}

/// GET {prefix}/health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match super::stats::collect(&state).await {
        Ok(stats) => {
            let body = SuccessResponse::new(
                "System is healthy",
                HealthStatus {
                    status: "healthy",
                    timestamp: Utc::now(),
                    database: DatabaseHealth {
                        connected: true,
                        stats: Some(stats),
                        error: None,
                    },
                },
            );
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            let body = SuccessResponse::failed(
                "System health check failed",
                HealthStatus {
                    status: "unhealthy",
                    timestamp: Utc::now(),
                    database: DatabaseHealth {
                        connected: false,
                        stats: None,
                        error: Some(e.code().to_string()),
                    },
                },
            );
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
