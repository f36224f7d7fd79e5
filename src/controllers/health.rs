use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::feed_item::{FeedItemService, FeedItemServiceApi};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(service): State<Arc<FeedItemService>>) -> impl IntoResponse {
    match service.count().await {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": "connected",
                "items": items
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "database": "disconnected"
                })),
            )
        }
    }
}
