//! Shop domain validation and Admin API endpoint construction.

use crate::error::ShopifyError;

/// Resolves a shop identifier to the origin the Admin API is served from.
///
/// A bare domain (`demo.myshopify.com`) becomes `https://demo.myshopify.com`.
/// A value that already carries a scheme is reduced to its origin, which is
/// how tests point the client at a local mock server.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidShopDomain`] for empty input, unparseable
/// URLs, or bare domains containing characters outside `[A-Za-z0-9.-:]`.
pub fn shop_origin(shop: &str) -> Result<String, ShopifyError> {
    let invalid = |reason: &str| ShopifyError::InvalidShopDomain {
        shop: shop.to_owned(),
        reason: reason.to_owned(),
    };

    let shop = shop.trim();
    if shop.is_empty() {
        return Err(invalid("shop domain is empty"));
    }

    if shop.contains("://") {
        let url = reqwest::Url::parse(shop).map_err(|e| invalid(&e.to_string()))?;
        if url.host_str().is_none() {
            return Err(invalid("URL has no host"));
        }
        return Ok(url.origin().ascii_serialization());
    }

    let valid = shop
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'));
    if !valid || shop.starts_with('.') || shop.ends_with('.') {
        return Err(invalid("expected a bare domain such as demo.myshopify.com"));
    }
    Ok(format!("https://{shop}"))
}

/// The Admin GraphQL endpoint for `shop` at `api_version`.
///
/// # Errors
///
/// Propagates [`shop_origin`] errors.
pub fn graphql_endpoint(shop: &str, api_version: &str) -> Result<String, ShopifyError> {
    let origin = shop_origin(shop)?;
    Ok(format!("{origin}/admin/api/{api_version}/graphql.json"))
}
