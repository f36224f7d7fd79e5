use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use my_feed_backend::domain::feed_item::{BatchDirectory, FeedItemService, FeedItemServiceApi};
use my_feed_backend::infrastructure::config::{Config, LogFormat};
use my_feed_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use my_feed_backend::infrastructure::http::{build_router, start_http_server};
use my_feed_backend::infrastructure::repositories::FeedItemRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting feed backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        feed_types = config.feed_types.all.len(),
        scored_types = config.feed_types.has_scores.len(),
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    let feed_item_repo = Arc::new(
        FeedItemRepository::new(pool.clone()).with_sql_echo(config.sql_echo),
    );
    let feed_item_service = Arc::new(FeedItemService::new(
        feed_item_repo,
        BatchDirectory::new(config.data_dir.clone()),
        Arc::new(config.feed_types.clone()),
    ));

    // Pick up whatever the producer left behind while we were down
    match feed_item_service.ingest().await {
        Ok(report) => {
            tracing::info!(added = report.added, "Startup ingestion finished");
            if let Some(e) = report.error {
                tracing::warn!(error = %e, "Startup ingestion skipped a batch file");
            }
        }
        Err(e) => tracing::error!(error = %e, "Startup ingestion failed"),
    }

    let count = feed_item_service.count().await?;
    tracing::info!("feedmodel table contains {} rows", count);

    let app = build_router(config.clone(), feed_item_service);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "my_feed_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
