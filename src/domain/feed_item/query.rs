use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::FeedTypes;
use super::error::FeedItemError;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    When,
    Score,
    Release,
}

impl FromStr for OrderBy {
    type Err = FeedItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "when" => Ok(OrderBy::When),
            "score" => Ok(OrderBy::Score),
            "release" => Ok(OrderBy::Release),
            _ => Err(FeedItemError::InvalidParameter {
                name: "order_by",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::When => write!(f, "when"),
            OrderBy::Score => write!(f, "score"),
            OrderBy::Release => write!(f, "release"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FeedItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(FeedItemError::InvalidParameter {
                name: "sort",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A validated, clamped query over stored feed items.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    /// Substring to search for; `None` when blank.
    pub text: Option<String>,
    /// Feed types to restrict to; empty means every type.
    pub feed_types: Vec<String>,
    pub order_by: OrderBy,
    pub sort: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            text: None,
            feed_types: Vec::new(),
            order_by: OrderBy::default(),
            sort: SortDirection::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl FeedQuery {
    /// Build a query, rejecting feed types the catalog does not know.
    pub fn new(
        text: Option<&str>,
        feed_types: Vec<String>,
        order_by: OrderBy,
        sort: SortDirection,
        limit: Option<i64>,
        offset: Option<i64>,
        catalog: &FeedTypes,
    ) -> Result<Self, FeedItemError> {
        if let Some(unknown) = feed_types.iter().find(|t| !catalog.contains(t)) {
            return Err(FeedItemError::UnknownFeedType(unknown.clone()));
        }

        Ok(Self {
            text: text
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
            feed_types,
            order_by,
            sort,
            limit: clamp_limit(limit),
            offset: clamp_offset(offset),
        })
    }
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Split a comma separated `ftype` parameter.
///
/// Segments are kept verbatim, so `album,` yields an empty type that the
/// catalog then rejects.
pub fn split_feed_types(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(r) if !r.is_empty() => r.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
