//! Feed generation and preview commands.

use shopfeed_server::pipeline::FeedPipeline;

/// Regenerate one shop's feed, or every shop's when `all` is set.
///
/// # Errors
///
/// Returns an error if any generation fails or the shop list cannot be read.
pub(crate) async fn run_generate(
    pipeline: &FeedPipeline,
    shop: Option<&str>,
    all: bool,
) -> anyhow::Result<()> {
    if all {
        let failures = pipeline.refresh_all().await?;
        if failures > 0 {
            anyhow::bail!("{failures} shop(s) failed to generate; see logs");
        }
        println!("all feeds regenerated");
        return Ok(());
    }

    let shop = shop.ok_or_else(|| anyhow::anyhow!("a shop domain or --all is required"))?;
    match pipeline.generate(shop).await {
        Ok(summary) => {
            println!(
                "{}: {} records generated at {}",
                summary.shop,
                summary.record_count,
                summary.generated_at.to_rfc3339()
            );
            Ok(())
        }
        Err(failure) => {
            anyhow::bail!("generation failed for {}: {}", failure.shop, failure.reason)
        }
    }
}

/// Print `shop`'s mapped catalog as NDJSON on stdout.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched or serialized.
pub(crate) async fn run_preview(
    pipeline: &FeedPipeline,
    shop: &str,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let mut records = pipeline.preview(shop).await?;
    let total = records.len();
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    let ndjson = shopfeed_feed::serialize_ndjson(&records)?;
    if !ndjson.is_empty() {
        println!("{ndjson}");
    }
    tracing::info!(shop, total, printed = records.len(), "preview complete");
    Ok(())
}
