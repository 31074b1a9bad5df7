//! Retry with exponential backoff for transient Admin API failures.
//!
//! Only throttling (HTTP 429 or a `THROTTLED` GraphQL error) and
//! network-level failures are retried. Everything else is returned on the
//! first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

fn is_retriable(err: &ShopifyError) -> bool {
    matches!(
        err,
        ShopifyError::RateLimited { .. } | ShopifyError::Http(_)
    )
}

/// Runs `operation`, retrying retriable errors up to `max_retries` times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, or the server's `Retry-After` when that is longer. With
/// `max_retries = 3` the operation runs at most 4 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let backoff_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        let delay_secs = match &err {
            ShopifyError::RateLimited {
                retry_after_secs, ..
            } if backoff_base_secs > 0 => backoff_secs.max(*retry_after_secs),
            _ => backoff_secs,
        };
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient Shopify error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
