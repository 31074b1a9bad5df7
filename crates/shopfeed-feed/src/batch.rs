use shopfeed_core::{FeedSettings, Product, ShopInfo};

use crate::error::FeedError;
use crate::mapper::map_one;
use crate::record::FeedRecord;

/// Maps every variant of every product, in input order, dropping skips.
#[must_use]
pub fn map_all(products: &[Product], shop: &ShopInfo, settings: &FeedSettings) -> Vec<FeedRecord> {
    products
        .iter()
        .flat_map(|product| {
            product
                .variants
                .iter()
                .filter_map(move |variant| map_one(product, variant, shop, settings))
        })
        .collect()
}

/// Serializes records as newline-delimited JSON: one object per line, no
/// trailing newline.
///
/// # Errors
///
/// Returns [`FeedError::Serialize`] if a record fails to serialize.
pub fn serialize_ndjson(records: &[FeedRecord]) -> Result<String, FeedError> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}
