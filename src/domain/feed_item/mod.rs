pub mod batch;
pub mod catalog;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod model;
pub mod query;
pub mod row;
pub mod service;

pub use batch::{BatchDirectory, BatchOrchestrator, IngestReport, IngestResponse};
pub use catalog::{CatalogError, FeedTypes};
pub use dedup::ModelIdSet;
pub use error::FeedItemError;
pub use ingest::BatchIngestor;
pub use model::{FeedItem, NewFeedItem, RawFeedItem};
pub use query::{FeedQuery, OrderBy, SortDirection};
pub use row::FeedItemRow;
pub use service::{FeedItemService, FeedItemServiceApi};

use serde::{Deserialize, Serialize};

/// Query string of `GET /data/`; values stay raw so bad input gets a precise message
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub query: Option<String>,
    pub ftype: Option<String>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Response for `/recheck`
#[derive(Debug, Serialize)]
pub struct RecheckResponse {
    pub removed: u64,
    pub added: u64,
    pub error: Option<String>,
}

impl RecheckResponse {
    pub fn new(removed: u64, report: IngestReport) -> Self {
        let IngestResponse { added, error } = report.into();
        Self {
            removed,
            added,
            error,
        }
    }
}
