//! Conversion from Admin API wire types to validated core types.

use shopfeed_core::{
    InventoryPolicy, Product, ProductStatus, SelectedOption, ShopInfo, ShopPolicies, Variant,
    VariantWeight,
};

use crate::types::{ShopifyPolicy, ShopifyProduct, ShopifyShop, ShopifyVariant};

const PRIVACY_POLICY: &str = "PRIVACY_POLICY";
const TERMS_OF_SERVICE: &str = "TERMS_OF_SERVICE";
const REFUND_POLICY: &str = "REFUND_POLICY";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Converts a product node.
///
/// Category is the taxonomy full name when set, else the free-form product
/// type, else empty. Blank image URLs are dropped.
#[must_use]
pub fn normalize_product(raw: ShopifyProduct) -> Product {
    let category = raw
        .category
        .and_then(|c| non_empty(c.full_name))
        .or_else(|| non_empty(raw.product_type))
        .unwrap_or_default();

    Product {
        id: raw.id,
        title: raw.title,
        description: raw.description.unwrap_or_default(),
        description_html: raw.description_html.unwrap_or_default(),
        handle: raw.handle,
        vendor: raw.vendor.unwrap_or_default(),
        category,
        status: ProductStatus::parse(&raw.status),
        online_store_url: non_empty(raw.online_store_url),
        images: raw
            .images
            .nodes
            .into_iter()
            .map(|img| img.url)
            .filter(|url| !url.trim().is_empty())
            .collect(),
        variants: raw.variants.nodes.into_iter().map(normalize_variant).collect(),
    }
}

fn normalize_variant(raw: ShopifyVariant) -> Variant {
    let weight = raw
        .inventory_item
        .and_then(|item| item.measurement)
        .and_then(|m| m.weight)
        .map(|w| VariantWeight {
            value: w.value,
            unit: w.unit,
        });

    Variant {
        id: raw.id,
        title: raw.title,
        sku: non_empty(raw.sku),
        price: raw.price,
        compare_at_price: non_empty(raw.compare_at_price),
        available_for_sale: raw.available_for_sale,
        inventory_quantity: raw.inventory_quantity,
        inventory_policy: raw
            .inventory_policy
            .as_deref()
            .map(InventoryPolicy::parse)
            .unwrap_or_default(),
        weight,
        selected_options: raw
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        image_url: raw.image.map(|img| img.url).filter(|u| !u.trim().is_empty()),
    }
}

#[must_use]
pub fn normalize_shop(raw: ShopifyShop) -> ShopInfo {
    ShopInfo {
        name: raw.name,
        url: raw.url,
        primary_domain_url: raw.primary_domain.and_then(|d| non_empty(d.url)),
        currency_code: non_empty(raw.currency_code),
        country_code: raw.billing_address.and_then(|a| non_empty(a.country_code_v2)),
        ships_to_countries: raw.ships_to_countries,
    }
}

/// Picks the privacy, terms and refund policy URLs. Other policy types are
/// ignored and any of the three may be absent.
#[must_use]
pub fn normalize_policies(raw: Vec<ShopifyPolicy>) -> ShopPolicies {
    let mut policies = ShopPolicies::default();
    for policy in raw {
        let slot = match policy.kind.as_str() {
            PRIVACY_POLICY => &mut policies.privacy_url,
            TERMS_OF_SERVICE => &mut policies.terms_url,
            REFUND_POLICY => &mut policies.refund_url,
            _ => continue,
        };
        if let Some(url) = non_empty(policy.url) {
            *slot = Some(url);
        }
    }
    policies
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
