//! Database operations for the `feed_cache` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `feed_cache` table: the last successfully generated feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedFeedRow {
    pub shop: String,
    /// Newline-delimited JSON, one record per line. Empty for a shop with
    /// no eligible products.
    pub payload: String,
    pub record_count: i32,
    pub generated_at: DateTime<Utc>,
}

impl CachedFeedRow {
    /// Generation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn generated_at_ms(&self) -> i64 {
        self.generated_at.timestamp_millis()
    }
}

/// Replaces `shop`'s cached feed and stamps its settings row with the
/// generation time and record count, in one transaction.
///
/// Either both writes land or neither does, so a failed generation never
/// leaves a partial cache state behind. The settings row must exist: a shop
/// deleted while its feed was being generated gets no cache row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `shop` has no settings row, or
/// [`DbError::Sqlx`] if any statement or the commit fails.
pub async fn replace_feed(
    pool: &PgPool,
    shop: &str,
    payload: &str,
    record_count: i32,
    generated_at: DateTime<Utc>,
) -> Result<CachedFeedRow, DbError> {
    let mut tx = pool.begin().await?;

    let stamped = sqlx::query(
        "UPDATE feed_settings \
         SET feed_generated_at = $1, product_count = $2, updated_at = NOW() \
         WHERE shop = $3",
    )
    .bind(generated_at)
    .bind(record_count)
    .bind(shop)
    .execute(&mut *tx)
    .await?;

    if stamped.rows_affected() == 0 {
        tracing::warn!(shop, "no settings row; feed not cached");
        return Err(DbError::NotFound);
    }

    let row = sqlx::query_as::<_, CachedFeedRow>(
        "INSERT INTO feed_cache (shop, payload, record_count, generated_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (shop) DO UPDATE SET \
             payload = EXCLUDED.payload, \
             record_count = EXCLUDED.record_count, \
             generated_at = EXCLUDED.generated_at, \
             updated_at = NOW() \
         RETURNING shop, payload, record_count, generated_at",
    )
    .bind(shop)
    .bind(payload)
    .bind(record_count)
    .bind(generated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Returns `shop`'s cached feed, or `None` if no generation has succeeded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn read_feed(pool: &PgPool, shop: &str) -> Result<Option<CachedFeedRow>, DbError> {
    let row = sqlx::query_as::<_, CachedFeedRow>(
        "SELECT shop, payload, record_count, generated_at \
         FROM feed_cache \
         WHERE shop = $1",
    )
    .bind(shop)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes `shop`'s cached feed. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_feed(pool: &PgPool, shop: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM feed_cache WHERE shop = $1")
        .bind(shop)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
