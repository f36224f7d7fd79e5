use crate::domain::feed_item::{FeedItemRow, FeedQuery, NewFeedItem, OrderBy};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use std::sync::Arc;

const SELECT_COLUMNS: &str = r#"model_id, ftype, title, score, subtitle, creator, part, subpart, collection, "when", release_date, image_url, url, data, flags"#;

/// Columns searched by the free-text query.
const SEARCH_COLUMNS: [&str; 5] = ["title", "subtitle", "creator", "collection", "model_id"];

pub struct FeedItemRepository {
    pool: Arc<DbPool>,
    sql_echo: bool,
}

impl FeedItemRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            pool,
            sql_echo: false,
        }
    }

    /// Log every built query and its arguments at debug level
    pub fn with_sql_echo(mut self, sql_echo: bool) -> Self {
        self.sql_echo = sql_echo;
        self
    }

    /// Every stored model id
    pub async fn model_ids(&self) -> AppResult<Vec<String>> {
        let pool = self.pool.as_ref();
        let ids = sqlx::query_scalar::<_, String>("SELECT model_id FROM feedmodel")
            .fetch_all(pool)
            .await?;

        Ok(ids)
    }

    /// Distinct feed types present in storage
    pub async fn feed_types(&self) -> AppResult<Vec<String>> {
        let pool = self.pool.as_ref();
        let types = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT ftype FROM feedmodel ORDER BY ftype",
        )
        .fetch_all(pool)
        .await?;

        Ok(types)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let pool = self.pool.as_ref();
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedmodel")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Remove every stored item, returning how many were deleted
    pub async fn delete_all(&self) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM feedmodel").execute(pool).await?;

        Ok(result.rows_affected())
    }

    /// Start the write transaction a whole batch file is staged in
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Stage one insert inside a batch transaction
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        item: &NewFeedItem,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feedmodel (
                model_id, ftype, title, score, subtitle, creator, part, subpart,
                collection, "when", release_date, image_url, url, data, flags
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.model_id)
        .bind(&item.feed_type)
        .bind(&item.title)
        .bind(item.score)
        .bind(&item.subtitle)
        .bind(&item.creator)
        .bind(item.part)
        .bind(item.subpart)
        .bind(&item.collection)
        .bind(item.when)
        .bind(item.release_date)
        .bind(&item.image_url)
        .bind(&item.url)
        .bind(&item.data)
        .bind(&item.flags)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Run a feed query, returning raw rows in result order
    pub async fn query(&self, query: &FeedQuery) -> AppResult<Vec<FeedItemRow>> {
        let pool = self.pool.as_ref();
        let mut builder = build_select(query);

        if self.sql_echo {
            tracing::debug!(
                sql = builder.sql(),
                text = ?query.text,
                feed_types = ?query.feed_types,
                limit = query.limit,
                offset = query.offset,
                "QUERY"
            );
        }

        let rows = builder
            .build_query_as::<FeedItemRow>()
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }
}

/// Translate a [`FeedQuery`] into a parameterized SELECT.
///
/// Every user supplied value is bound; only column names and sort keywords
/// are pushed as SQL text.
pub fn build_select(query: &FeedQuery) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM feedmodel", SELECT_COLUMNS));
    let mut has_where = false;

    if !query.feed_types.is_empty() {
        push_condition(&mut builder, &mut has_where);
        builder.push("ftype IN (");
        let mut separated = builder.separated(", ");
        for feed_type in &query.feed_types {
            separated.push_bind(feed_type.clone());
        }
        separated.push_unseparated(")");
    }

    // LIKE is ASCII case-insensitive in SQLite and case-sensitive otherwise
    if let Some(text) = &query.text {
        let pattern = format!("%{}%", text);
        push_condition(&mut builder, &mut has_where);
        builder.push("(");
        let mut separated = builder.separated(" OR ");
        for column in SEARCH_COLUMNS {
            separated.push(column);
            separated.push_unseparated(" LIKE ");
            separated.push_bind_unseparated(pattern.clone());
        }
        separated.push_unseparated(")");
    }

    let direction = query.sort.as_sql();
    match query.order_by {
        OrderBy::When => {
            builder.push(format!(r#" ORDER BY "when" {}"#, direction));
        }
        OrderBy::Score => {
            push_condition(&mut builder, &mut has_where);
            builder.push("score IS NOT NULL AND score > 0");
            // The tiebreak stays newest-first whichever way the score is sorted
            builder.push(format!(r#" ORDER BY score {}, "when" DESC"#, direction));
        }
        OrderBy::Release => {
            push_condition(&mut builder, &mut has_where);
            builder.push("release_date IS NOT NULL");
            builder.push(format!(" ORDER BY release_date {}", direction));
        }
    }

    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    builder
}

fn push_condition(builder: &mut QueryBuilder<'static, Sqlite>, has_where: &mut bool) {
    if *has_where {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_where = true;
    }
}
