use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::error::FeedItemError;
use super::model::{FeedItem, RELEASE_DATE_FORMAT};

/// A `feedmodel` row exactly as stored; `data` and `flags` are still JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct FeedItemRow {
    pub model_id: String,
    #[sqlx(rename = "ftype")]
    pub feed_type: String,
    pub title: String,
    pub score: Option<f64>,
    pub subtitle: Option<String>,
    pub creator: Option<String>,
    pub part: Option<i64>,
    pub subpart: Option<i64>,
    pub collection: Option<String>,
    pub when: i64,
    pub release_date: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub data: Option<String>,
    pub flags: Option<String>,
}

impl TryFrom<FeedItemRow> for FeedItem {
    type Error = FeedItemError;

    fn try_from(row: FeedItemRow) -> Result<Self, Self::Error> {
        let release_date = row
            .release_date
            .as_deref()
            .map(parse_stored_date)
            .transpose()?;

        let data: Map<String, Value> = match non_empty(row.data.as_deref()) {
            Some(text) => serde_json::from_str(text).map_err(|source| {
                FeedItemError::CorruptField {
                    field: "data",
                    source,
                }
            })?,
            None => Map::new(),
        };
        let flags: Vec<String> = match non_empty(row.flags.as_deref()) {
            Some(text) => serde_json::from_str(text).map_err(|source| {
                FeedItemError::CorruptField {
                    field: "flags",
                    source,
                }
            })?,
            None => Vec::new(),
        };

        Ok(FeedItem {
            model_id: row.model_id,
            feed_type: row.feed_type,
            when: row.when,
            title: row.title,
            score: row.score,
            subtitle: row.subtitle,
            creator: row.creator,
            part: row.part,
            subpart: row.subpart,
            collection: row.collection,
            release_date,
            image_url: row.image_url,
            url: row.url,
            data,
            flags,
        })
    }
}

/// Materialize a whole result set; one corrupt row fails all of it.
pub fn materialize(rows: Vec<FeedItemRow>) -> Result<Vec<FeedItem>, FeedItemError> {
    rows.into_iter().map(FeedItem::try_from).collect()
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

// Only the date portion is kept, whatever time component was stored with it.
fn parse_stored_date(stored: &str) -> Result<NaiveDate, FeedItemError> {
    let date_part = stored
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(stored);
    NaiveDate::parse_from_str(date_part, RELEASE_DATE_FORMAT).map_err(|_| {
        FeedItemError::DateFormat {
            value: stored.to_string(),
        }
    })
}
