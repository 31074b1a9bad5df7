//! Single GraphQL request execution with retry.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ShopifyError;
use crate::rate_limit::retry_with_backoff;
use crate::types::GraphQlResponse;

use super::origin::graphql_endpoint;
use super::ShopifyClient;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

impl ShopifyClient {
    /// POSTs `query` with `variables` and returns the decoded `data` field.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`]: HTTP 429 or `THROTTLED`, after retries.
    /// - [`ShopifyError::Unauthorized`]: HTTP 401/403 (not retried).
    /// - [`ShopifyError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ShopifyError::Http`]: network failure after retries.
    /// - [`ShopifyError::Deserialize`]: body does not match the expected shape.
    /// - [`ShopifyError::GraphQl`]: the response carried `errors`.
    /// - [`ShopifyError::MalformedResponse`]: no `data` and no `errors`.
    pub(super) async fn execute<T: DeserializeOwned>(
        &self,
        shop: &str,
        access_token: &str,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let url = graphql_endpoint(shop, &self.api_version)?;
        let body = json!({ "query": query, "variables": variables });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = &body;
            async move {
                let response = self
                    .client
                    .post(&url)
                    .header(ACCESS_TOKEN_HEADER, access_token)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(parse_retry_after)
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(ShopifyError::RateLimited {
                        shop: shop.to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(ShopifyError::Unauthorized {
                        shop: shop.to_owned(),
                    });
                }

                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let text = response.text().await?;
                let parsed: GraphQlResponse<T> =
                    serde_json::from_str(&text).map_err(|e| ShopifyError::Deserialize {
                        context: format!("{operation} response from {shop}"),
                        source: e,
                    })?;

                if !parsed.errors.is_empty() {
                    if parsed.errors.iter().any(|e| e.is_throttled()) {
                        return Err(ShopifyError::RateLimited {
                            shop: shop.to_owned(),
                            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
                        });
                    }
                    let messages = parsed
                        .errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(ShopifyError::GraphQl {
                        shop: shop.to_owned(),
                        messages,
                    });
                }

                parsed.data.ok_or_else(|| ShopifyError::MalformedResponse {
                    shop: shop.to_owned(),
                    reason: format!("{operation} response has no data"),
                })
            }
        })
        .await
    }
}

/// Shopify sends `Retry-After` as seconds, sometimes fractional (`"2.0"`).
fn parse_retry_after(raw: &str) -> Option<u64> {
    let secs = raw.trim().parse::<f64>().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(secs.ceil() as u64)
    } else {
        None
    }
}
