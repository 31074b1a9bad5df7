//! Cursor handling for Admin GraphQL connections.

use crate::error::ShopifyError;
use crate::types::PageInfo;

/// Returns the cursor for the next page, or `None` on the last page.
///
/// # Errors
///
/// Returns [`ShopifyError::MalformedResponse`] when `pageInfo` is missing,
/// or when it claims another page without supplying an `endCursor`.
pub fn next_cursor(shop: &str, page_info: Option<&PageInfo>) -> Result<Option<String>, ShopifyError> {
    let Some(info) = page_info else {
        return Err(ShopifyError::MalformedResponse {
            shop: shop.to_owned(),
            reason: "products connection has no pageInfo".to_owned(),
        });
    };
    cursor_after(shop, "products", info)
}

/// Cursor for the rest of a product's nested `connection` (variants or
/// images), or `None` when the first page already holds everything.
///
/// A nested connection without `pageInfo` is complete.
///
/// # Errors
///
/// Returns [`ShopifyError::MalformedResponse`] when `hasNextPage` is true
/// without an `endCursor`.
pub fn nested_cursor(
    shop: &str,
    connection: &str,
    page_info: Option<&PageInfo>,
) -> Result<Option<String>, ShopifyError> {
    match page_info {
        Some(info) => cursor_after(shop, connection, info),
        None => Ok(None),
    }
}

fn cursor_after(shop: &str, connection: &str, info: &PageInfo) -> Result<Option<String>, ShopifyError> {
    if !info.has_next_page {
        return Ok(None);
    }

    match info.end_cursor.as_deref().map(str::trim) {
        Some(cursor) if !cursor.is_empty() => Ok(Some(cursor.to_owned())),
        _ => Err(ShopifyError::MalformedResponse {
            shop: shop.to_owned(),
            reason: format!("{connection} hasNextPage is true but endCursor is missing"),
        }),
    }
}
