use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::db::{check_connection, DbPool};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness reflects the configured cache backend: with Postgres the
/// connection is probed; the in-memory store is always ready.
pub async fn health_ready(State(pool): State<Arc<Option<DbPool>>>) -> impl IntoResponse {
    match pool.as_ref() {
        Some(pool) => match check_connection(pool).await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "cache_store": "postgres",
                    "database": "connected"
                })),
            ),
            Err(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "cache_store": "postgres",
                    "database": "disconnected"
                })),
            ),
        },
        None => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "cache_store": "in-memory"
            })),
        ),
    }
}
