use shopfeed_core::settings::DEFAULT_COUNTRY;
use shopfeed_core::{FeedSettings, Product, ShopInfo, Variant, DEFAULT_OPTION_VALUE};

use crate::derive;
use crate::record::{FeedRecord, ReturnsBlock};
use crate::text::strip_markup;

const DEFAULT_CATEGORY: &str = "Uncategorized";
const CONDITION_NEW: &str = "new";

/// Maps one product variant to a feed record.
///
/// Returns `None` when the product is not active or no image resolves for
/// the variant. Skips are expected and are not errors.
#[must_use]
pub fn map_one(
    product: &Product,
    variant: &Variant,
    shop: &ShopInfo,
    settings: &FeedSettings,
) -> Option<FeedRecord> {
    if !product.is_active() {
        tracing::debug!(product_id = %product.id, status = ?product.status, "skipping inactive product");
        return None;
    }

    let Some(image_link) = main_image(product, variant) else {
        tracing::debug!(
            product_id = %product.id,
            variant_id = %variant.id,
            "skipping variant without image"
        );
        return None;
    };

    let product_id = product.numeric_id();
    let shop_url = derive::shop_url(shop, settings);
    let pricing = derive::pricing(variant, derive::currency(shop));
    let has_variations = product.variants.len() > 1
        || variant.first_option_value() != Some(DEFAULT_OPTION_VALUE);

    let sku = variant.sku.as_deref().filter(|s| !s.is_empty());
    let id = sku.map_or_else(
        || format!("{product_id}-{}", variant.numeric_id()),
        str::to_owned,
    );

    let title = if has_variations {
        format!("{} - {}", product.title, variant.title)
    } else {
        product.title.clone()
    };

    let link = product
        .online_store_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("{shop_url}/products/{}", product.handle));

    let brand = non_empty(&product.vendor)
        .or_else(|| settings.seller_name.as_deref().and_then(non_empty))
        .unwrap_or_default()
        .to_owned();

    let seller_name = settings
        .seller_name
        .as_deref()
        .and_then(non_empty)
        .or_else(|| non_empty(&shop.name))
        .unwrap_or_default()
        .to_owned();

    let returns = settings
        .return_policy_url
        .as_deref()
        .and_then(non_empty)
        .map(|url| ReturnsBlock {
            accepts_returns: settings.accepts_returns,
            return_deadline_in_days: settings.return_deadline_days,
            accepts_exchanges: settings.accepts_exchanges,
            return_policy: url.to_owned(),
        });

    let store_country = settings
        .store_country
        .as_deref()
        .and_then(non_empty)
        .or_else(|| shop.country_code.as_deref().and_then(non_empty))
        .unwrap_or(DEFAULT_COUNTRY)
        .to_owned();

    Some(FeedRecord {
        enable_search: settings.enable_search,
        enable_checkout: settings.enable_checkout,
        id,
        mpn: sku.map(str::to_owned),
        title,
        description: description(product),
        link,
        condition: CONDITION_NEW,
        product_category: non_empty(&product.category)
            .unwrap_or(DEFAULT_CATEGORY)
            .to_owned(),
        brand,
        weight: derive::weight(variant.weight.as_ref()),
        additional_image_link: additional_images(product, &image_link),
        image_link,
        price: pricing.price,
        sale_price: pricing.sale_price,
        availability: derive::availability(variant),
        inventory_quantity: variant.inventory_quantity,
        item_group_id: product_id.to_owned(),
        item_group_title: product.title.clone(),
        listing_has_variations: has_variations,
        variant_dict: derive::variant_dict(&variant.selected_options),
        color: derive::option_value(&variant.selected_options, "color"),
        size: derive::option_value(&variant.selected_options, "size"),
        seller_name,
        seller_url: shop_url.to_owned(),
        seller_privacy_policy: settings
            .privacy_policy_url
            .as_deref()
            .and_then(non_empty)
            .map(str::to_owned),
        seller_tos: settings
            .terms_of_service_url
            .as_deref()
            .and_then(non_empty)
            .map(str::to_owned),
        returns,
        target_countries: settings
            .target_countries
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(DEFAULT_COUNTRY)
            .to_owned(),
        store_country,
    })
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

fn main_image(product: &Product, variant: &Variant) -> Option<String> {
    variant
        .image_url
        .as_deref()
        .and_then(non_empty)
        .or_else(|| product.images.first().map(String::as_str).and_then(non_empty))
        .map(str::to_owned)
}

fn additional_images(product: &Product, main: &str) -> Option<String> {
    let rest: Vec<&str> = product
        .images
        .iter()
        .map(String::as_str)
        .filter(|url| *url != main && !url.is_empty())
        .collect();
    (!rest.is_empty()).then(|| rest.join(","))
}

/// Plain description, else stripped HTML, else the product title.
fn description(product: &Product) -> String {
    if let Some(plain) = non_empty(&product.description) {
        return plain.trim().to_owned();
    }
    let stripped = strip_markup(&product.description_html);
    if stripped.is_empty() {
        product.title.clone()
    } else {
        stripped
    }
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
