//! Database operations for the `feed_settings` table.

use chrono::{DateTime, Utc};
use shopfeed_core::{FeedSettings, SettingsPatch};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `feed_settings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedSettingsRow {
    pub id: i64,
    pub shop: String,
    pub enable_search: bool,
    pub enable_checkout: bool,
    pub seller_name: Option<String>,
    pub seller_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub terms_of_service_url: Option<String>,
    pub return_policy_url: Option<String>,
    pub accepts_returns: bool,
    pub return_deadline_days: i32,
    pub accepts_exchanges: bool,
    pub store_country: Option<String>,
    pub target_countries: Option<String>,
    pub feed_generated_at: Option<DateTime<Utc>>,
    pub product_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeedSettingsRow> for FeedSettings {
    fn from(row: FeedSettingsRow) -> Self {
        Self {
            shop: row.shop,
            enable_search: row.enable_search,
            enable_checkout: row.enable_checkout,
            seller_name: row.seller_name,
            seller_url: row.seller_url,
            privacy_policy_url: row.privacy_policy_url,
            terms_of_service_url: row.terms_of_service_url,
            return_policy_url: row.return_policy_url,
            accepts_returns: row.accepts_returns,
            return_deadline_days: row.return_deadline_days,
            accepts_exchanges: row.accepts_exchanges,
            store_country: row.store_country,
            target_countries: row.target_countries,
            feed_generated_at: row.feed_generated_at,
            product_count: row.product_count,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, shop, enable_search, enable_checkout, seller_name, \
            seller_url, privacy_policy_url, terms_of_service_url, return_policy_url, \
            accepts_returns, return_deadline_days, accepts_exchanges, store_country, \
            target_countries, feed_generated_at, product_count, created_at, updated_at \
     FROM feed_settings";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the settings row for `shop`, or `None` if it has never been created.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_settings(pool: &PgPool, shop: &str) -> Result<Option<FeedSettingsRow>, DbError> {
    let row = sqlx::query_as::<_, FeedSettingsRow>(&format!("{SELECT_COLUMNS} WHERE shop = $1"))
        .bind(shop)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Returns the settings for `shop`, inserting the first-run defaults if no
/// row exists yet.
///
/// The insert is `ON CONFLICT (shop) DO NOTHING`, so concurrent first calls
/// for the same shop produce exactly one row and all callers read it back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn get_or_create_settings(pool: &PgPool, shop: &str) -> Result<FeedSettings, DbError> {
    let defaults = FeedSettings::defaults(shop);

    sqlx::query(
        "INSERT INTO feed_settings \
             (shop, enable_search, enable_checkout, accepts_returns, return_deadline_days, \
              accepts_exchanges, store_country, target_countries) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (shop) DO NOTHING",
    )
    .bind(shop)
    .bind(defaults.enable_search)
    .bind(defaults.enable_checkout)
    .bind(defaults.accepts_returns)
    .bind(defaults.return_deadline_days)
    .bind(defaults.accepts_exchanges)
    .bind(&defaults.store_country)
    .bind(&defaults.target_countries)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, FeedSettingsRow>(&format!("{SELECT_COLUMNS} WHERE shop = $1"))
        .bind(shop)
        .fetch_one(pool)
        .await?;

    Ok(row.into())
}

/// Applies a whitelisted partial update to `shop`'s settings.
///
/// Creates the row with defaults first if needed. Only fields present in
/// `patch` are written, plus `updated_at`. An empty patch performs no write
/// at all.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the row vanished between creation and
/// update (a concurrent delete), or [`DbError::Sqlx`] on query failure.
pub async fn update_settings(
    pool: &PgPool,
    shop: &str,
    patch: &SettingsPatch,
) -> Result<(), DbError> {
    if patch.is_empty() {
        return Ok(());
    }

    get_or_create_settings(pool, shop).await?;

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE feed_settings SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(v) = patch.enable_search {
            set.push("enable_search = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.enable_checkout {
            set.push("enable_checkout = ").push_bind_unseparated(v);
        }
        if let Some(v) = &patch.seller_name {
            set.push("seller_name = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.seller_url {
            set.push("seller_url = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.privacy_policy_url {
            set.push("privacy_policy_url = ")
                .push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.terms_of_service_url {
            set.push("terms_of_service_url = ")
                .push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.return_policy_url {
            set.push("return_policy_url = ")
                .push_bind_unseparated(v.clone());
        }
        if let Some(v) = patch.accepts_returns {
            set.push("accepts_returns = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.return_deadline_days {
            set.push("return_deadline_days = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.accepts_exchanges {
            set.push("accepts_exchanges = ").push_bind_unseparated(v);
        }
        if let Some(v) = &patch.store_country {
            set.push("store_country = ").push_bind_unseparated(v.clone());
        }
        if let Some(v) = &patch.target_countries {
            set.push("target_countries = ")
                .push_bind_unseparated(v.clone());
        }
        set.push("updated_at = NOW()");
    }
    qb.push(" WHERE shop = ").push_bind(shop);

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Lists every shop that has a settings row, ordered by shop.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_settings_shops(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let shops = sqlx::query_scalar::<_, String>("SELECT shop FROM feed_settings ORDER BY shop")
        .fetch_all(pool)
        .await?;
    Ok(shops)
}

/// Deletes `shop`'s settings row. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_settings(pool: &PgPool, shop: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM feed_settings WHERE shop = $1")
        .bind(shop)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Removes everything stored for `shop`: the settings row and the cached feed.
///
/// Both deletes are always issued, and deleting a shop with no rows is not an
/// error. If one delete fails the other still runs and the first error is
/// returned; the surviving row is left in place with no compensation.
///
/// # Errors
///
/// Returns the first [`DbError`] encountered.
pub async fn delete_shop(pool: &PgPool, shop: &str) -> Result<(), DbError> {
    let settings = delete_settings(pool, shop).await;
    let cache = crate::feed_cache::delete_feed(pool, shop).await;

    match (settings, cache) {
        (Ok(settings_rows), Ok(cache_rows)) => {
            tracing::info!(shop, settings_rows, cache_rows, "deleted shop data");
            Ok(())
        }
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => {
            tracing::error!(shop, error = %e, "shop delete partially failed");
            Err(e)
        }
        (Err(e), Err(second)) => {
            tracing::error!(shop, error = %e, second_error = %second, "shop delete failed");
            Err(e)
        }
    }
}
