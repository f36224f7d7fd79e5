use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::feed_item::{
    FeedItemService, FeedItemServiceApi, IngestResponse, RecheckResponse,
};
use crate::error::AppResult;

pub struct IngestController {
    service: Arc<FeedItemService>,
}

impl IngestController {
    pub fn new(service: Arc<FeedItemService>) -> Self {
        Self { service }
    }

    /// /check - Load any new batch files
    pub async fn check(
        State(controller): State<Arc<IngestController>>,
    ) -> AppResult<Json<IngestResponse>> {
        tracing::info!("Running check");
        let report = controller.service.ingest().await?;
        tracing::info!(added = report.added, "Added new items");
        Ok(Json(report.into()))
    }

    /// /recheck - Clear the database and load the batch files again
    pub async fn recheck(
        State(controller): State<Arc<IngestController>>,
    ) -> AppResult<Json<RecheckResponse>> {
        tracing::info!("Running recheck");
        let (removed, report) = controller.service.recheck().await?;
        tracing::info!(removed, added = report.added, "Reloaded items");
        Ok(Json(RecheckResponse::new(removed, report)))
    }

    /// /clear-data-dir - Delete every batch file
    pub async fn clear_data_dir(
        State(controller): State<Arc<IngestController>>,
    ) -> AppResult<Json<Value>> {
        tracing::info!("Clearing data dir");
        let removed = controller.service.clear_data_dir().await?;
        Ok(Json(json!({ "removed": removed })))
    }
}
