//! HTTP client for the Shopify Admin GraphQL API.

mod fetch_all;
mod graphql;
mod origin;
mod shop;

use std::time::Duration;

use reqwest::Client;
use shopfeed_core::AppConfig;

use crate::error::ShopifyError;

pub use origin::{graphql_endpoint, shop_origin};

/// Maximum number of product pages to fetch before returning an error.
/// Guards against a cursor that never terminates.
///
/// Each page request may be retried up to `max_retries` times, so the
/// worst-case request count is `MAX_PAGES * (1 + max_retries)`.
pub(super) const MAX_PAGES: usize = 500;

pub const USER_AGENT: &str = concat!("shopfeed/", env!("CARGO_PKG_VERSION"));

/// Admin GraphQL client shared across shops.
///
/// The access token is passed per call so one client serves every shop.
/// Throttling (HTTP 429 or a `THROTTLED` GraphQL error) and network failures
/// are retried with exponential backoff up to `max_retries` extra attempts.
pub struct ShopifyClient {
    pub(super) client: Client,
    pub(super) api_version: String,
    /// Products requested per page, 1 to 250.
    pub(super) page_size: u32,
    pub(super) max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_secs * 2^attempt`.
    pub(super) backoff_base_secs: u64,
}

impl ShopifyClient {
    /// Creates a client with the given timeout, `User-Agent`, API version,
    /// page size and retry policy. `max_retries = 0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        api_version: &str,
        page_size: u32,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            api_version: api_version.to_owned(),
            page_size: page_size.clamp(1, 250),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the `SHOPFEED_SHOPIFY_*` settings.
    ///
    /// # Errors
    ///
    /// See [`ShopifyClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ShopifyError> {
        Self::new(
            config.shopify_request_timeout_secs,
            USER_AGENT,
            &config.shopify_api_version,
            config.shopify_page_size,
            config.shopify_max_retries,
            config.shopify_retry_backoff_base_secs,
        )
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
