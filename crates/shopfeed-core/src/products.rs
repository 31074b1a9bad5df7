use serde::{Deserialize, Serialize};

/// Option value Shopify assigns to products that have no real variation.
pub const DEFAULT_OPTION_VALUE: &str = "Default Title";

/// Reduces a Shopify global ID (`gid://shopify/Product/123`) to its trailing
/// segment (`"123"`). Plain IDs are returned unchanged.
#[must_use]
pub fn numeric_id(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

/// Product lifecycle status as reported by the Admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    Active,
    Draft,
    Archived,
    /// Any status this crate does not model (e.g. `UNLISTED`). Never eligible.
    #[serde(other)]
    Other,
}

impl ProductStatus {
    /// Parses a status string case-insensitively. Unknown values map to
    /// [`ProductStatus::Other`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("active") {
            Self::Active
        } else if raw.eq_ignore_ascii_case("draft") {
            Self::Draft
        } else if raw.eq_ignore_ascii_case("archived") {
            Self::Archived
        } else {
            Self::Other
        }
    }
}

/// What happens when a variant's tracked inventory reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryPolicy {
    /// Stop selling at zero stock.
    #[default]
    Deny,
    /// Keep selling regardless of stock.
    Continue,
}

impl InventoryPolicy {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("continue") {
            Self::Continue
        } else {
            Self::Deny
        }
    }
}

/// A product from the merchant's catalog, already validated at the fetch
/// boundary. Read-only input to the feed mapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Shopify global ID, e.g. `"gid://shopify/Product/8001"`.
    pub id: String,
    pub title: String,
    /// Plain-text description. Empty when the product has none.
    pub description: String,
    /// Raw HTML description. Empty when the product has none.
    pub description_html: String,
    pub handle: String,
    pub vendor: String,
    /// Full taxonomy path or product type. Empty when unset.
    pub category: String,
    pub status: ProductStatus,
    /// Canonical storefront URL; `None` when the product is not published
    /// to the online store.
    pub online_store_url: Option<String>,
    /// Product image URLs in gallery order.
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Numeric portion of the product's global ID.
    #[must_use]
    pub fn numeric_id(&self) -> &str {
        numeric_id(&self.id)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// A single purchasable variant of a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Shopify global ID, e.g. `"gid://shopify/ProductVariant/9001"`.
    pub id: String,
    /// Display title, `"Default Title"` for single-variant products.
    pub title: String,
    pub sku: Option<String>,
    /// Price as a decimal string exactly as Shopify returns it, e.g. `"10.00"`.
    pub price: String,
    /// Pre-discount list price, if set.
    pub compare_at_price: Option<String>,
    pub available_for_sale: bool,
    /// `None` when inventory is not tracked or not visible to the app.
    pub inventory_quantity: Option<i64>,
    pub inventory_policy: InventoryPolicy,
    pub weight: Option<VariantWeight>,
    /// Option name/value pairs in declared order.
    pub selected_options: Vec<SelectedOption>,
    /// Dedicated variant image URL, if any.
    pub image_url: Option<String>,
}

impl Variant {
    #[must_use]
    pub fn numeric_id(&self) -> &str {
        numeric_id(&self.id)
    }

    /// First declared option value, used to detect single-variant products.
    #[must_use]
    pub fn first_option_value(&self) -> Option<&str> {
        self.selected_options.first().map(|o| o.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// Shipping weight. `unit` is the Admin API enum name (`"KILOGRAMS"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantWeight {
    pub value: f64,
    pub unit: String,
}
