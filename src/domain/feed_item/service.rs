use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::batch::{BatchDirectory, BatchOrchestrator, IngestReport};
use super::catalog::FeedTypes;
use super::dedup::ModelIdSet;
use super::error::FeedItemError;
use super::ingest::BatchIngestor;
use super::model::FeedItem;
use super::query::{FeedQuery, OrderBy};
use super::row::materialize;
use crate::infrastructure::repositories::FeedItemRepository;

pub struct FeedItemService {
    repo: Arc<FeedItemRepository>,
    orchestrator: BatchOrchestrator,
    catalog: Arc<FeedTypes>,
    // One ingestion run at a time; later files must see earlier inserts
    ingest_lock: Mutex<()>,
}

impl FeedItemService {
    pub fn new(
        repo: Arc<FeedItemRepository>,
        directory: BatchDirectory,
        catalog: Arc<FeedTypes>,
    ) -> Self {
        let orchestrator = BatchOrchestrator::new(BatchIngestor::new(repo.clone()), directory);
        Self {
            repo,
            orchestrator,
            catalog,
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &FeedTypes {
        &self.catalog
    }
}

#[async_trait]
pub trait FeedItemServiceApi: Send + Sync {
    /// Load every pending batch file.
    async fn ingest(&self) -> Result<IngestReport, FeedItemError>;

    /// Remove every stored item, returning the number removed.
    async fn clear_all(&self) -> Result<u64, FeedItemError>;

    /// Clear storage, then ingest again from the batch directory.
    async fn recheck(&self) -> Result<(u64, IngestReport), FeedItemError>;

    async fn query(&self, query: FeedQuery) -> Result<Vec<FeedItem>, FeedItemError>;

    async fn model_ids(&self) -> Result<Vec<String>, FeedItemError>;

    async fn feed_types(&self) -> Result<Vec<String>, FeedItemError>;

    async fn count(&self) -> Result<i64, FeedItemError>;

    /// Delete every batch file, returning the number removed.
    async fn clear_data_dir(&self) -> Result<usize, FeedItemError>;
}

#[async_trait]
impl FeedItemServiceApi for FeedItemService {
    async fn ingest(&self) -> Result<IngestReport, FeedItemError> {
        let _guard = self.ingest_lock.lock().await;
        self.ingest_locked().await
    }

    async fn clear_all(&self) -> Result<u64, FeedItemError> {
        let _guard = self.ingest_lock.lock().await;
        self.clear_locked().await
    }

    async fn recheck(&self) -> Result<(u64, IngestReport), FeedItemError> {
        let _guard = self.ingest_lock.lock().await;
        let removed = self.clear_locked().await?;
        let report = self.ingest_locked().await?;
        Ok((removed, report))
    }

    async fn query(&self, mut query: FeedQuery) -> Result<Vec<FeedItem>, FeedItemError> {
        if query.order_by == OrderBy::Score {
            if let Some(eligible) = self.catalog.score_eligible(&query.feed_types) {
                if eligible.is_empty() {
                    return Ok(Vec::new());
                }
                query.feed_types = eligible;
            }
        }

        let rows = self.repo.query(&query).await?;
        materialize(rows)
    }

    async fn model_ids(&self) -> Result<Vec<String>, FeedItemError> {
        Ok(self.repo.model_ids().await?)
    }

    async fn feed_types(&self) -> Result<Vec<String>, FeedItemError> {
        Ok(self.repo.feed_types().await?)
    }

    async fn count(&self) -> Result<i64, FeedItemError> {
        Ok(self.repo.count().await?)
    }

    async fn clear_data_dir(&self) -> Result<usize, FeedItemError> {
        let _guard = self.ingest_lock.lock().await;
        self.orchestrator.directory().clear().await
    }
}

impl FeedItemService {
    async fn ingest_locked(&self) -> Result<IngestReport, FeedItemError> {
        // Rebuilt every run so administrative clears are never shadowed
        let mut known: ModelIdSet = self.repo.model_ids().await?.into_iter().collect();
        tracing::info!(known = known.len(), "Feed items already in the database");

        let report = self.orchestrator.run(&mut known).await?;
        tracing::info!(added = report.added, "Ingestion run finished");
        Ok(report)
    }

    async fn clear_locked(&self) -> Result<u64, FeedItemError> {
        let removed = self.repo.delete_all().await?;
        tracing::info!(removed, "Cleared feed items");
        Ok(removed)
    }
}
