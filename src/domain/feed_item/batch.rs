use serde::Serialize;
use std::path::PathBuf;

use super::dedup::ModelIdSet;
use super::error::FeedItemError;
use super::ingest::BatchIngestor;

pub const BATCH_SUFFIX: &str = ".json";

/// The directory the producer drops batch files into.
#[derive(Debug, Clone)]
pub struct BatchDirectory {
    dir: PathBuf,
}

impl BatchDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Batch files in lexical filename order.
    pub async fn list(&self) -> Result<Vec<PathBuf>, FeedItemError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_name().to_string_lossy().ends_with(BATCH_SUFFIX) {
                continue;
            }
            // Follows symlinks
            let path = entry.path();
            if tokio::fs::metadata(&path).await?.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete every batch file except the lexically last one.
    pub async fn prune_to_latest(&self) -> Result<usize, FeedItemError> {
        let files = self.list().await?;
        let Some((_, older)) = files.split_last() else {
            return Ok(0);
        };
        for file in older {
            tracing::info!(file = %file.display(), "Pruning old batch file");
            tokio::fs::remove_file(file).await?;
        }
        Ok(older.len())
    }

    /// Delete every batch file.
    pub async fn clear(&self) -> Result<usize, FeedItemError> {
        let files = self.list().await?;
        for file in &files {
            tracing::info!(file = %file.display(), "Removing batch file");
            tokio::fs::remove_file(file).await?;
        }
        Ok(files.len())
    }
}

/// Outcome of one ingestion run over the batch directory.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub added: u64,
    /// The last per-file failure of the run, if any
    pub error: Option<FeedItemError>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub added: u64,
    pub error: Option<String>,
}

impl From<IngestReport> for IngestResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            added: report.added,
            error: report.error.map(|e| e.to_string()),
        }
    }
}

/// Feeds every pending batch file to the ingestor, one after another.
pub struct BatchOrchestrator {
    ingestor: BatchIngestor,
    directory: BatchDirectory,
}

impl BatchOrchestrator {
    pub fn new(ingestor: BatchIngestor, directory: BatchDirectory) -> Self {
        Self {
            ingestor,
            directory,
        }
    }

    pub fn directory(&self) -> &BatchDirectory {
        &self.directory
    }

    /// Ingest all files in lexical order, then prune to the newest file.
    ///
    /// A file that fails is deleted so it is not retried forever; the run
    /// carries on with the next one. Only listing the directory is fatal.
    pub async fn run(&self, known: &mut ModelIdSet) -> Result<IngestReport, FeedItemError> {
        let files = self.directory.list().await?;
        let mut report = IngestReport::default();

        for file in files {
            tracing::info!(file = %file.display(), "Loading batch file");
            match self.ingestor.ingest_file(&file, known).await {
                Ok(added) => report.added += added,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "Failed to load batch file");
                    if let Err(remove_err) = tokio::fs::remove_file(&file).await {
                        tracing::error!(
                            file = %file.display(),
                            error = %remove_err,
                            "Could not remove failed batch file"
                        );
                    }
                    report.error = Some(e.in_file(file));
                }
            }
        }

        if let Err(e) = self.directory.prune_to_latest().await {
            tracing::warn!(error = %e, "Failed to prune batch directory");
            report.error = Some(e);
        }

        Ok(report)
    }
}
