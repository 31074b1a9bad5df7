//! Wire types for Admin GraphQL responses.
//!
//! These mirror the selections in the query documents and are converted to
//! `shopfeed_core` types by [`crate::normalize`]. Nullable fields are
//! `Option`; connection `nodes` default to empty.

use serde::Deserialize;

/// Top-level GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

impl GraphQlError {
    /// Shopify reports cost-based throttling as a 200 with this error code.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            == Some("THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    /// Required by the query; a missing value is a malformed response.
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub nodes: Vec<ShopifyProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyProduct {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub handle: String,
    pub vendor: Option<String>,
    pub status: String,
    pub online_store_url: Option<String>,
    pub product_type: Option<String>,
    pub category: Option<TaxonomyCategory>,
    #[serde(default)]
    pub images: Connection<ShopifyImage>,
    #[serde(default)]
    pub variants: Connection<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyCategory {
    pub full_name: Option<String>,
}

/// A nested connection on a product. `page_info` is absent in payloads
/// that do not select it, which reads as a complete connection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            page_info: None,
            nodes: Vec::new(),
        }
    }
}

/// Follow-up page of one product's variants.
#[derive(Debug, Deserialize)]
pub struct ProductVariantsData {
    pub product: Option<ProductVariantsNode>,
}

#[derive(Debug, Deserialize)]
pub struct ProductVariantsNode {
    pub variants: Connection<ShopifyVariant>,
}

/// Follow-up page of one product's images.
#[derive(Debug, Deserialize)]
pub struct ProductImagesData {
    pub product: Option<ProductImagesNode>,
}

#[derive(Debug, Deserialize)]
pub struct ProductImagesNode {
    pub images: Connection<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyVariant {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub available_for_sale: bool,
    pub inventory_quantity: Option<i64>,
    pub inventory_policy: Option<String>,
    pub image: Option<ShopifyImage>,
    #[serde(default)]
    pub selected_options: Vec<ShopifySelectedOption>,
    pub inventory_item: Option<InventoryItem>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifySelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct InventoryItem {
    pub measurement: Option<Measurement>,
}

#[derive(Debug, Deserialize)]
pub struct Measurement {
    pub weight: Option<Weight>,
}

#[derive(Debug, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopData {
    pub shop: ShopifyShop,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyShop {
    pub name: String,
    pub url: String,
    pub currency_code: Option<String>,
    pub primary_domain: Option<PrimaryDomain>,
    pub billing_address: Option<BillingAddress>,
    #[serde(default)]
    pub ships_to_countries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrimaryDomain {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub country_code_v2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PoliciesData {
    pub shop: ShopPoliciesNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPoliciesNode {
    #[serde(default)]
    pub shop_policies: Vec<ShopifyPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyPolicy {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
}
