//! Small per-variant field derivations used by the record mapper.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use shopfeed_core::{
    FeedSettings, InventoryPolicy, SelectedOption, ShopInfo, Variant, VariantWeight,
    DEFAULT_OPTION_VALUE,
};

use crate::record::Availability;

pub const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_WEIGHT_UNIT: &str = "lb";

/// Price fields after compare-at resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pricing {
    pub price: String,
    pub sale_price: Option<String>,
}

/// Derives availability in priority order.
///
/// The last branch repeats the `available_for_sale` test already made above
/// it, so a sellable variant never reaches it. Kept so edge-case output stays
/// stable for feed consumers.
#[must_use]
pub fn availability(variant: &Variant) -> Availability {
    if variant.inventory_policy == InventoryPolicy::Continue {
        return Availability::InStock;
    }
    if variant.available_for_sale {
        return Availability::InStock;
    }
    if variant.inventory_quantity.is_some_and(|q| q <= 0) {
        return Availability::OutOfStock;
    }
    if variant.available_for_sale {
        Availability::InStock
    } else {
        Availability::OutOfStock
    }
}

/// Formats price fields. When compare-at is strictly greater than the price,
/// compare-at is advertised as `price` and the variant price becomes
/// `sale_price`.
#[must_use]
pub fn pricing(variant: &Variant, currency: &str) -> Pricing {
    let fmt = |amount: &str| format!("{amount} {currency}");

    let discounted_from = variant.compare_at_price.as_deref().filter(|compare_at| {
        match (parse_amount(compare_at), parse_amount(&variant.price)) {
            (Some(c), Some(p)) => c > p,
            _ => false,
        }
    });

    match discounted_from {
        Some(compare_at) => Pricing {
            price: fmt(compare_at),
            sale_price: Some(fmt(&variant.price)),
        },
        None => Pricing {
            price: fmt(&variant.price),
            sale_price: None,
        },
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Currency code for price strings, `USD` when the shop reports none.
#[must_use]
pub fn currency(shop: &ShopInfo) -> &str {
    shop.currency_code
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
}

/// `"{value} {unit}"` for positive weights, `None` otherwise.
#[must_use]
pub fn weight(weight: Option<&VariantWeight>) -> Option<String> {
    let w = weight.filter(|w| w.value > 0.0)?;
    Some(format!("{} {}", w.value, weight_unit(&w.unit)))
}

#[must_use]
pub fn weight_unit(unit: &str) -> &'static str {
    match unit {
        "KILOGRAMS" => "kg",
        "GRAMS" => "g",
        "POUNDS" => "lb",
        "OUNCES" => "oz",
        _ => DEFAULT_WEIGHT_UNIT,
    }
}

/// Value of the option whose name matches `name` case-insensitively,
/// unless that value is the default-title sentinel.
#[must_use]
pub fn option_value(options: &[SelectedOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.name.eq_ignore_ascii_case(name))
        .filter(|o| o.value != DEFAULT_OPTION_VALUE)
        .map(|o| o.value.clone())
}

/// JSON object string of lower-cased option names to values, in declared
/// order. `None` for no options or a lone default-title option.
#[must_use]
pub fn variant_dict(options: &[SelectedOption]) -> Option<String> {
    match options {
        [] => return None,
        [only] if only.value == DEFAULT_OPTION_VALUE => return None,
        _ => {}
    }

    let dict: Map<String, Value> = options
        .iter()
        .map(|o| (o.name.to_lowercase(), Value::String(o.value.clone())))
        .collect();
    Some(Value::Object(dict).to_string())
}

/// Storefront base URL: merchant override, then primary domain, then the
/// generic shop URL. One trailing slash is removed.
#[must_use]
pub fn shop_url<'a>(shop: &'a ShopInfo, settings: &'a FeedSettings) -> &'a str {
    match settings.seller_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url.strip_suffix('/').unwrap_or(url),
        None => shop.storefront_url(),
    }
}
