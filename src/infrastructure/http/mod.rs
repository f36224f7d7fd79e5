use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::{data::DataController, health, ingest::IngestController};
use crate::domain::feed_item::FeedItemService;
use crate::infrastructure::auth::{auth_middleware, request_id_middleware};
use crate::infrastructure::config::Config;

/// Build the application router with all routes configured
pub fn build_router(config: Arc<Config>, feed_item_service: Arc<FeedItemService>) -> Router {
    let data_controller = Arc::new(DataController::new(
        feed_item_service.clone(),
        config.log_requests,
    ));
    let ingest_controller = Arc::new(IngestController::new(feed_item_service.clone()));

    // Ingestion routes (require the bearer secret)
    let ingest_routes = Router::new()
        .route(
            "/check",
            get(IngestController::check).post(IngestController::check),
        )
        .route(
            "/recheck",
            get(IngestController::recheck).post(IngestController::recheck),
        )
        .route(
            "/clear-data-dir",
            get(IngestController::clear_data_dir).post(IngestController::clear_data_dir),
        )
        .with_state(ingest_controller)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    // Id listing (requires the bearer secret)
    let protected_data_routes = Router::new()
        .route("/data/ids", get(DataController::list_ids))
        .with_state(data_controller.clone())
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_middleware,
        ));

    // Public read routes
    let data_routes = Router::new()
        .route("/data", get(DataController::list_items))
        .route("/data/", get(DataController::list_items))
        .route("/data/types", get(DataController::list_types))
        .with_state(data_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(feed_item_service)
        .merge(ingest_routes)
        .merge(protected_data_routes)
        .merge(data_routes)
        .layer(cors_layer(&config))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if !config.cors_origins.is_empty() {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        return CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    if config.is_development() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
