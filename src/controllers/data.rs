use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::domain::feed_item::query::split_feed_types;
use crate::domain::feed_item::{
    DataParams, FeedItem, FeedItemError, FeedItemService, FeedItemServiceApi, FeedQuery,
    OrderBy, SortDirection,
};
use crate::error::AppResult;

pub struct DataController {
    service: Arc<FeedItemService>,
    log_requests: bool,
}

impl DataController {
    pub fn new(service: Arc<FeedItemService>, log_requests: bool) -> Self {
        Self {
            service,
            log_requests,
        }
    }

    /// GET /data/ - Filtered, sorted, paginated feed items
    pub async fn list_items(
        State(controller): State<Arc<DataController>>,
        Query(params): Query<DataParams>,
    ) -> AppResult<Json<Vec<FeedItem>>> {
        let query = controller.parse_query(params)?;

        if controller.log_requests {
            tracing::info!(
                offset = query.offset,
                limit = query.limit,
                order_by = %query.order_by,
                sort = %query.sort,
                ftypes = ?query.feed_types,
                query = ?query.text,
                "Running data query"
            );
        }

        let items = controller.service.query(query).await?;
        Ok(Json(items))
    }

    /// GET /data/ids - Every stored model id
    pub async fn list_ids(
        State(controller): State<Arc<DataController>>,
    ) -> AppResult<Json<Vec<String>>> {
        let ids = controller.service.model_ids().await?;
        if controller.log_requests {
            tracing::info!(count = ids.len(), "Found ids");
        }
        Ok(Json(ids))
    }

    /// GET /data/types - Distinct stored feed types
    pub async fn list_types(
        State(controller): State<Arc<DataController>>,
    ) -> AppResult<Json<Vec<String>>> {
        let types = controller.service.feed_types().await?;
        Ok(Json(types))
    }

    fn parse_query(&self, params: DataParams) -> Result<FeedQuery, FeedItemError> {
        let offset = parse_integer("offset", params.offset.as_deref())?;
        let limit = parse_integer("limit", params.limit.as_deref())?;
        let order_by = match non_empty(params.order_by.as_deref()) {
            Some(raw) => raw.parse::<OrderBy>()?,
            None => OrderBy::default(),
        };
        let sort = match non_empty(params.sort.as_deref()) {
            Some(raw) => raw.parse::<SortDirection>()?,
            None => SortDirection::default(),
        };

        FeedQuery::new(
            params.query.as_deref(),
            split_feed_types(params.ftype.as_deref()),
            order_by,
            sort,
            limit,
            offset,
            self.service.catalog(),
        )
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|r| !r.is_empty())
}

fn parse_integer(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, FeedItemError> {
    non_empty(raw)
        .map(|r| {
            r.parse::<i64>().map_err(|_| FeedItemError::InvalidParameter {
                name,
                value: r.to_string(),
            })
        })
        .transpose()
}
