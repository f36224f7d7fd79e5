use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::FeedItemError;

pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One line of a batch file, as the producer wrote it.
///
/// Required fields default to their empty value, whether absent or `null`, so
/// that a missing field is reported by [`RawFeedItem::validate`] instead of
/// failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeedItem {
    #[serde(rename = "id", alias = "model_id", default, deserialize_with = "null_as_default")]
    pub model_id: String,
    #[serde(rename = "ftype", alias = "feed_type", default, deserialize_with = "null_as_default")]
    pub feed_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub when: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub score: Option<f64>,
    pub subtitle: Option<String>,
    pub creator: Option<String>,
    pub part: Option<i64>,
    pub subpart: Option<i64>,
    pub collection: Option<String>,
    pub release_date: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub flags: Option<Vec<String>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawFeedItem {
    /// Fails on the first missing required field, in column order.
    pub fn validate(&self) -> Result<(), FeedItemError> {
        if self.model_id.is_empty() {
            return Err(FeedItemError::MissingField("model_id"));
        }
        if self.feed_type.is_empty() {
            return Err(FeedItemError::MissingField("ftype"));
        }
        if self.when == 0 {
            return Err(FeedItemError::MissingField("when"));
        }
        if self.title.is_empty() {
            return Err(FeedItemError::MissingField("title"));
        }
        Ok(())
    }

    /// Serialize the structured fields and parse the release date for storage.
    pub fn into_new_item(self) -> Result<NewFeedItem, FeedItemError> {
        let release_date = self
            .release_date
            .map(|value| {
                NaiveDate::parse_from_str(&value, RELEASE_DATE_FORMAT)
                    .map_err(|_| FeedItemError::DateFormat { value })
            })
            .transpose()?;

        let data = match self.data {
            Some(data) if !data.is_empty() => {
                Some(serde_json::to_string(&data).map_err(FeedItemError::Decode)?)
            }
            _ => None,
        };
        let flags = match self.flags {
            Some(flags) if !flags.is_empty() => {
                Some(serde_json::to_string(&flags).map_err(FeedItemError::Decode)?)
            }
            _ => None,
        };

        Ok(NewFeedItem {
            model_id: self.model_id,
            feed_type: self.feed_type,
            when: self.when,
            title: self.title,
            score: self.score,
            subtitle: self.subtitle,
            creator: self.creator,
            part: self.part,
            subpart: self.subpart,
            collection: self.collection,
            release_date,
            image_url: self.image_url,
            url: self.url,
            data,
            flags,
        })
    }
}

/// A validated record ready to be inserted; `data` and `flags` are JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedItem {
    pub model_id: String,
    pub feed_type: String,
    pub when: i64,
    pub title: String,
    pub score: Option<f64>,
    pub subtitle: Option<String>,
    pub creator: Option<String>,
    pub part: Option<i64>,
    pub subpart: Option<i64>,
    pub collection: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub data: Option<String>,
    pub flags: Option<String>,
}

/// A stored feed item as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(rename = "id")]
    pub model_id: String,
    #[serde(rename = "ftype")]
    pub feed_type: String,
    pub when: i64,
    pub title: String,
    pub score: Option<f64>,
    pub subtitle: Option<String>,
    pub creator: Option<String>,
    pub part: Option<i64>,
    pub subpart: Option<i64>,
    pub collection: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub data: Map<String, Value>,
    pub flags: Vec<String>,
}
