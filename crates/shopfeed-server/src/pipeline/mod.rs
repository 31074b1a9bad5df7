//! Feed generation pipeline: fetch, map, serialize, cache.

mod locks;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopfeed_core::{FeedSettings, SettingsPatch};
use shopfeed_db::{CachedFeedRow, DbError};
use shopfeed_feed::{map_all, serialize_ndjson, FeedError, FeedRecord};
use shopfeed_shopify::{ShopifyClient, ShopifyError};
use sqlx::PgPool;
use thiserror::Error;

pub use locks::{ShopGuard, ShopLocks};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no Admin API access token configured for {0}")]
    MissingToken(String),
    #[error(transparent)]
    Shopify(#[from] ShopifyError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// A successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub shop: String,
    pub record_count: i32,
    pub generated_at: DateTime<Utc>,
}

/// What stopped a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No Admin API token is configured for the shop.
    MissingToken,
    /// An Admin API request failed or returned unusable data.
    Upstream,
    /// The store failed, or the shop was removed while generating.
    Store,
    /// Mapped records could not be serialized.
    Serialize,
}

impl From<&GenerateError> for FailureKind {
    fn from(error: &GenerateError) -> Self {
        match error {
            GenerateError::MissingToken(_) => Self::MissingToken,
            GenerateError::Shopify(_) => Self::Upstream,
            GenerateError::Db(_) => Self::Store,
            GenerateError::Feed(_) => Self::Serialize,
        }
    }
}

/// A failed generation. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationFailure {
    pub shop: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Coordinates the Admin API client, the mapper and the store for every shop.
pub struct FeedPipeline {
    pool: PgPool,
    client: Arc<ShopifyClient>,
    shop_tokens: BTreeMap<String, String>,
    locks: ShopLocks,
}

impl FeedPipeline {
    #[must_use]
    pub fn new(
        pool: PgPool,
        client: Arc<ShopifyClient>,
        shop_tokens: BTreeMap<String, String>,
    ) -> Self {
        Self {
            pool,
            client,
            shop_tokens,
            locks: ShopLocks::default(),
        }
    }

    fn token(&self, shop: &str) -> Result<&str, GenerateError> {
        self.shop_tokens
            .get(shop)
            .map(String::as_str)
            .ok_or_else(|| GenerateError::MissingToken(shop.to_owned()))
    }

    /// Regenerates `shop`'s feed and replaces its cached copy.
    ///
    /// Shop info and settings are read concurrently, then the full catalog is
    /// fetched, mapped and written in one transaction. Calls for the same shop
    /// run one at a time, and never alongside [`FeedPipeline::remove_shop`].
    /// On any failure nothing is written and the reason is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] describing the first error encountered.
    pub async fn generate(&self, shop: &str) -> Result<GenerationSummary, GenerationFailure> {
        let result = match self.token(shop) {
            Ok(token) => {
                let _guard = self.locks.acquire(shop).await;
                tracing::info!(shop, "feed generation started");
                self.try_generate(shop, token).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                tracing::info!(
                    shop,
                    record_count = summary.record_count,
                    "feed generation complete"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(shop, error = %e, "feed generation failed");
                Err(GenerationFailure {
                    shop: shop.to_owned(),
                    kind: FailureKind::from(&e),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn try_generate(
        &self,
        shop: &str,
        token: &str,
    ) -> Result<GenerationSummary, GenerateError> {
        let (shop_info, settings) = tokio::try_join!(
            async {
                self.client
                    .fetch_shop_info(shop, token)
                    .await
                    .map_err(GenerateError::from)
            },
            async {
                shopfeed_db::get_or_create_settings(&self.pool, shop)
                    .await
                    .map_err(GenerateError::from)
            },
        )?;

        let products = self.client.fetch_all_products(shop, token).await?;
        let records = map_all(&products, &shop_info, &settings);
        let payload = serialize_ndjson(&records)?;
        let record_count = i32::try_from(records.len()).unwrap_or(i32::MAX);

        let row = shopfeed_db::replace_feed(&self.pool, shop, &payload, record_count, Utc::now())
            .await?;

        Ok(GenerationSummary {
            shop: row.shop,
            record_count: row.record_count,
            generated_at: row.generated_at,
        })
    }

    /// The last successfully generated feed, or `None` if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the read fails.
    pub async fn read(&self, shop: &str) -> Result<Option<CachedFeedRow>, DbError> {
        shopfeed_db::read_feed(&self.pool, shop).await
    }

    /// Pulls shop info and policy URLs from the Admin API into `shop`'s
    /// settings and returns the refreshed settings.
    ///
    /// Only values the shop actually reports are written; a shop with no
    /// published policies leaves the stored policy URLs untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] on a missing token, fetch failure or store
    /// failure.
    pub async fn auto_populate(&self, shop: &str) -> Result<FeedSettings, GenerateError> {
        let token = self.token(shop)?;

        let (info, policies) = tokio::try_join!(
            self.client.fetch_shop_info(shop, token),
            self.client.fetch_shop_policies(shop, token),
        )?;

        let patch = SettingsPatch::from_shop(&info, &policies);
        shopfeed_db::update_settings(&self.pool, shop, &patch).await?;
        let settings = shopfeed_db::get_or_create_settings(&self.pool, shop).await?;

        tracing::info!(shop, "settings synced from shop");
        Ok(settings)
    }

    /// Maps `shop`'s live catalog without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] on a missing token, fetch failure or store
    /// failure.
    pub async fn preview(&self, shop: &str) -> Result<Vec<FeedRecord>, GenerateError> {
        let token = self.token(shop)?;
        let (shop_info, settings) = tokio::try_join!(
            async {
                self.client
                    .fetch_shop_info(shop, token)
                    .await
                    .map_err(GenerateError::from)
            },
            async {
                shopfeed_db::get_or_create_settings(&self.pool, shop)
                    .await
                    .map_err(GenerateError::from)
            },
        )?;
        let products = self.client.fetch_all_products(shop, token).await?;
        Ok(map_all(&products, &shop_info, &settings))
    }

    /// Removes `shop`'s settings and cached feed.
    ///
    /// Waits for an in-flight generation of `shop` to finish first, so a
    /// generation cannot recreate the cache row after removal.
    ///
    /// # Errors
    ///
    /// Returns the first [`DbError`]; both deletes are attempted regardless.
    pub async fn remove_shop(&self, shop: &str) -> Result<(), DbError> {
        let _guard = self.locks.acquire(shop).await;
        shopfeed_db::delete_shop(&self.pool, shop).await
    }

    /// Regenerates every shop that has stored settings, one after another.
    /// Returns the number of shops that failed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the shop list cannot be read.
    pub async fn refresh_all(&self) -> Result<usize, DbError> {
        let shops = shopfeed_db::list_settings_shops(&self.pool).await?;
        let mut failures = 0usize;
        for shop in &shops {
            if self.generate(shop).await.is_err() {
                failures += 1;
            }
        }
        tracing::info!(shops = shops.len(), failures, "feed refresh finished");
        Ok(failures)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
