//! Database operations for the `trending_topics` table.

use chrono::{DateTime, Utc};
use scout_core::{Category, NewTrend, PlatformIcon, TrendRecord};
use sqlx::{PgPool, Postgres, Transaction};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A raw row from the `trending_topics` table.
///
/// `platform_icon` and `category` are stored as text; [`TrendRow::into_record`]
/// maps them back onto the core enums.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub topic_name: String,
    pub short_description: String,
    pub trending_context: Option<String>,
    pub platform_icon: String,
    pub hashtags: Vec<String>,
    pub source: Option<String>,
    pub category: Option<String>,
}

impl TrendRow {
    /// Convert the raw row into a [`TrendRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored icon or category is not a
    /// known enum value.
    pub fn into_record(self) -> Result<TrendRecord, DbError> {
        let id = self.id;
        let invalid = |reason: String| DbError::InvalidRow { id, reason };

        let platform_icon = self
            .platform_icon
            .parse::<PlatformIcon>()
            .map_err(|e| invalid(e.to_string()))?;
        let category = self
            .category
            .as_deref()
            .map(Category::from_label)
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(TrendRecord {
            id,
            created_at: self.created_at,
            trend: NewTrend {
                topic_name: self.topic_name,
                short_description: self.short_description,
                trending_context: self.trending_context,
                platform_icon,
                hashtags: self.hashtags,
                source: self.source,
                category,
            },
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, created_at, topic_name, short_description, \
     trending_context, platform_icon, hashtags, source, category \
     FROM trending_topics";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List the most recent trends, newest first.
///
/// Ordered by `created_at DESC, id DESC` so rows inserted in the same
/// transaction come back in reverse insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored row cannot be mapped.
pub async fn list_recent_trends(pool: &PgPool, limit: i64) -> Result<Vec<TrendRecord>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TrendRow::into_record).collect()
}

/// List the most recent trends for one category, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored row cannot be mapped.
pub async fn list_recent_trends_in_category(
    pool: &PgPool,
    category: Category,
    limit: i64,
) -> Result<Vec<TrendRecord>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(&format!(
        "{SELECT_COLUMNS} WHERE category = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
    ))
    .bind(category.label())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TrendRow::into_record).collect()
}

/// Insert a batch of trends in a single transaction.
///
/// An empty batch returns `Ok(0)` without touching the pool. Otherwise either
/// every row is written or none is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails; the
/// transaction is rolled back on drop.
pub async fn insert_trends(pool: &PgPool, trends: &[NewTrend]) -> Result<u64, DbError> {
    if trends.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let inserted = insert_rows(&mut tx, trends).await?;
    tx.commit().await?;
    Ok(inserted)
}

/// Replace every trend stored under `category` with `trends`.
///
/// The delete and the inserts share one transaction, so a failed insert
/// leaves the category's previous rows in place and readers never observe
/// it empty. Returns `(replaced, inserted)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete, any insert, or the commit fails;
/// the transaction is rolled back on drop.
pub async fn replace_trends_in_category(
    pool: &PgPool,
    category: Category,
    trends: &[NewTrend],
) -> Result<(u64, u64), DbError> {
    let mut tx = pool.begin().await?;

    let replaced = sqlx::query("DELETE FROM trending_topics WHERE category = $1")
        .bind(category.label())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let inserted = insert_rows(&mut tx, trends).await?;

    tx.commit().await?;
    Ok((replaced, inserted))
}

async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    trends: &[NewTrend],
) -> Result<u64, DbError> {
    let mut inserted: u64 = 0;

    for trend in trends {
        let result = sqlx::query(
            "INSERT INTO trending_topics \
                 (topic_name, short_description, trending_context, platform_icon, \
                  hashtags, source, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&trend.topic_name)
        .bind(&trend.short_description)
        .bind(trend.trending_context.as_deref())
        .bind(trend.platform_icon.as_str())
        .bind(&trend.hashtags)
        .bind(trend.source.as_deref())
        .bind(trend.category.map(Category::label))
        .execute(&mut **tx)
        .await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Delete every trend stored under `category`, returning the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_trends_by_category(pool: &PgPool, category: Category) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM trending_topics WHERE category = $1")
        .bind(category.label())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
