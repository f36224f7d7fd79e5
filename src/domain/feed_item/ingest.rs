use std::path::Path;
use std::sync::Arc;

use super::dedup::ModelIdSet;
use super::error::FeedItemError;
use super::model::RawFeedItem;
use crate::infrastructure::repositories::FeedItemRepository;

/// Loads one batch file into storage inside a single transaction.
pub struct BatchIngestor {
    repo: Arc<FeedItemRepository>,
}

impl BatchIngestor {
    pub fn new(repo: Arc<FeedItemRepository>) -> Self {
        Self { repo }
    }

    /// Insert every record of `path` whose model id is not yet known.
    ///
    /// Returns the number of records added. Any decode, validation or
    /// storage failure rolls the whole file back; ids this call marked as
    /// known are then forgotten again so a later file may still insert them.
    pub async fn ingest_file(
        &self,
        path: &Path,
        known: &mut ModelIdSet,
    ) -> Result<u64, FeedItemError> {
        let mut staged: Vec<String> = Vec::new();
        let result = self.load(path, known, &mut staged).await;

        if result.is_err() {
            for model_id in &staged {
                known.remove(model_id);
            }
        }
        result
    }

    async fn load(
        &self,
        path: &Path,
        known: &mut ModelIdSet,
        staged: &mut Vec<String>,
    ) -> Result<u64, FeedItemError> {
        let bytes = tokio::fs::read(path).await?;
        let mut tx = self.repo.begin().await?;
        let mut lines = 0u64;

        // Records end wherever a JSON value is complete, not at newlines
        let records = serde_json::Deserializer::from_slice(&bytes).into_iter::<RawFeedItem>();
        for record in records {
            let record = record.map_err(FeedItemError::Decode)?;
            lines += 1;

            record.validate()?;

            if known.has(&record.model_id) {
                continue;
            }

            let model_id = record.model_id.clone();
            let item = record.into_new_item()?;
            self.repo.insert(&mut tx, &item).await?;

            known.add(model_id.clone());
            staged.push(model_id);
        }

        tx.commit().await?;

        tracing::info!(
            file = %path.display(),
            lines,
            added = staged.len(),
            "Checked batch file"
        );
        Ok(staged.len() as u64)
    }
}
