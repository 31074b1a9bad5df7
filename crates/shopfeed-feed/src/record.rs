//! The feed record wire shape.
//!
//! Field declaration order is the serialized key order. Optional keys are
//! omitted when absent; nothing here ever serializes as `null`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    /// Reserved. No current rule produces it.
    Preorder,
}

/// Returns terms, emitted as a unit only when a return policy URL exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnsBlock {
    pub accepts_returns: bool,
    pub return_deadline_in_days: i32,
    pub accepts_exchanges: bool,
    pub return_policy: String,
}

/// One purchasable variant in the target marketplace schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedRecord {
    pub enable_search: bool,
    pub enable_checkout: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    pub title: String,
    pub description: String,
    pub link: String,
    pub condition: &'static str,
    pub product_category: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    pub image_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_image_link: Option<String>,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<i64>,
    pub item_group_id: String,
    pub item_group_title: String,
    pub listing_has_variations: bool,
    /// JSON object string keyed by lower-cased option name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_dict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub seller_name: String,
    pub seller_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_privacy_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_tos: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnsBlock>,
    pub target_countries: String,
    pub store_country: String,
}
