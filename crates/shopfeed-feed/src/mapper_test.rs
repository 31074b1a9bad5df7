use shopfeed_core::{
    InventoryPolicy, ProductStatus, SelectedOption, ShopInfo, VariantWeight,
};

use super::*;
use crate::record::Availability;

fn shop() -> ShopInfo {
    ShopInfo {
        name: "Demo Store".to_string(),
        url: "https://demo.myshopify.com".to_string(),
        primary_domain_url: None,
        currency_code: Some("USD".to_string()),
        country_code: Some("CA".to_string()),
        ships_to_countries: vec!["US".to_string(), "CA".to_string()],
    }
}

fn settings() -> FeedSettings {
    FeedSettings::defaults("demo.myshopify.com")
}

fn variant() -> Variant {
    Variant {
        id: "gid://shopify/ProductVariant/9001".to_string(),
        title: "Default Title".to_string(),
        sku: None,
        price: "10.00".to_string(),
        compare_at_price: None,
        available_for_sale: true,
        inventory_quantity: None,
        inventory_policy: InventoryPolicy::Deny,
        weight: None,
        selected_options: vec![SelectedOption {
            name: "Title".to_string(),
            value: "Default Title".to_string(),
        }],
        image_url: None,
    }
}

fn product() -> Product {
    Product {
        id: "gid://shopify/Product/8001".to_string(),
        title: "Mug".to_string(),
        description: String::new(),
        description_html: String::new(),
        handle: "mug".to_string(),
        vendor: String::new(),
        category: String::new(),
        status: ProductStatus::Active,
        online_store_url: None,
        images: vec!["https://x/m.jpg".to_string()],
        variants: vec![variant()],
    }
}

fn map(product: &Product) -> Option<FeedRecord> {
    map_one(product, &product.variants[0], &shop(), &settings())
}

#[test]
fn basic_single_variant_product() {
    let record = map(&product()).expect("record");
    assert_eq!(record.title, "Mug");
    assert_eq!(record.price, "10.00 USD");
    assert_eq!(record.availability, Availability::InStock);
    assert!(record.variant_dict.is_none());
    assert!(record.sale_price.is_none());
    assert!(!record.listing_has_variations);
    assert_eq!(record.id, "8001-9001");
    assert_eq!(record.item_group_id, "8001");
    assert_eq!(record.item_group_title, "Mug");
    assert_eq!(record.condition, "new");
    assert_eq!(record.product_category, "Uncategorized");
    assert_eq!(record.image_link, "https://x/m.jpg");
    assert!(record.additional_image_link.is_none());
    assert_eq!(record.link, "https://demo.myshopify.com/products/mug");
}

#[test]
fn discounted_variant_swaps_price() {
    let mut p = product();
    p.variants[0].price = "8.00".to_string();
    p.variants[0].compare_at_price = Some("10.00".to_string());
    let record = map(&p).expect("record");
    assert_eq!(record.price, "10.00 USD");
    assert_eq!(record.sale_price.as_deref(), Some("8.00 USD"));
}

#[test]
fn draft_product_is_skipped() {
    let mut p = product();
    p.status = ProductStatus::Draft;
    assert!(map(&p).is_none());
    p.status = ProductStatus::Other;
    assert!(map(&p).is_none());
}

#[test]
fn out_of_stock_via_deny_policy() {
    let mut p = product();
    p.variants[0].available_for_sale = false;
    p.variants[0].inventory_quantity = Some(0);
    let record = map(&p).expect("record");
    assert_eq!(record.availability, Availability::OutOfStock);
    assert_eq!(record.inventory_quantity, Some(0));
}

#[test]
fn variant_without_any_image_is_skipped() {
    let mut p = product();
    p.images.clear();
    assert!(map(&p).is_none());
}

#[test]
fn variant_image_takes_priority_and_rest_become_additional() {
    let mut p = product();
    p.images = vec![
        "https://x/a.jpg".to_string(),
        "https://x/b.jpg".to_string(),
        "https://x/c.jpg".to_string(),
    ];
    p.variants[0].image_url = Some("https://x/b.jpg".to_string());
    let record = map(&p).expect("record");
    assert_eq!(record.image_link, "https://x/b.jpg");
    assert_eq!(
        record.additional_image_link.as_deref(),
        Some("https://x/a.jpg,https://x/c.jpg")
    );
}

#[test]
fn sku_becomes_id_and_mpn() {
    let mut p = product();
    p.variants[0].sku = Some("MUG-01".to_string());
    let record = map(&p).expect("record");
    assert_eq!(record.id, "MUG-01");
    assert_eq!(record.mpn.as_deref(), Some("MUG-01"));

    p.variants[0].sku = Some(String::new());
    let record = map(&p).expect("record");
    assert_eq!(record.id, "8001-9001");
    assert!(record.mpn.is_none());
}

#[test]
fn multi_variant_titles_get_variant_suffix() {
    let mut p = product();
    let mut large = variant();
    large.id = "gid://shopify/ProductVariant/9002".to_string();
    large.title = "Large / Red".to_string();
    large.selected_options = vec![
        SelectedOption {
            name: "Size".to_string(),
            value: "Large".to_string(),
        },
        SelectedOption {
            name: "Color".to_string(),
            value: "Red".to_string(),
        },
    ];
    p.variants.push(large);

    let record = map_one(&p, &p.variants[1], &shop(), &settings()).expect("record");
    assert_eq!(record.title, "Mug - Large / Red");
    assert!(record.listing_has_variations);
    assert_eq!(record.size.as_deref(), Some("Large"));
    assert_eq!(record.color.as_deref(), Some("Red"));
    assert_eq!(
        record.variant_dict.as_deref(),
        Some(r#"{"size":"Large","color":"Red"}"#)
    );

    // The sentinel variant of a multi-variant product still counts as a variation.
    let first = map_one(&p, &p.variants[0], &shop(), &settings()).expect("record");
    assert_eq!(first.title, "Mug - Default Title");
}

#[test]
fn description_fallback_chain() {
    let mut p = product();
    p.description_html = "<p>Holds &amp; keeps <b>coffee</b> hot</p>".to_string();
    assert_eq!(map(&p).expect("record").description, "Holds & keeps coffee hot");

    p.description = "Plain text".to_string();
    assert_eq!(map(&p).expect("record").description, "Plain text");

    p.description = "  ".to_string();
    p.description_html = "<br/>".to_string();
    assert_eq!(map(&p).expect("record").description, "Mug");
}

#[test]
fn canonical_url_wins_over_built_link() {
    let mut p = product();
    p.online_store_url = Some("https://demo.com/products/mug".to_string());
    assert_eq!(map(&p).expect("record").link, "https://demo.com/products/mug");
}

#[test]
fn link_uses_override_url_with_one_slash_stripped() {
    let p = product();
    let mut s = settings();
    s.seller_url = Some("https://brand.example/".to_string());
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    assert_eq!(record.link, "https://brand.example/products/mug");
    assert_eq!(record.seller_url, "https://brand.example");
}

#[test]
fn brand_and_seller_fallbacks() {
    let p = product();
    let record = map(&p).expect("record");
    assert_eq!(record.brand, "");
    assert_eq!(record.seller_name, "Demo Store");

    let mut s = settings();
    s.seller_name = Some("Brand Co".to_string());
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    assert_eq!(record.brand, "Brand Co");
    assert_eq!(record.seller_name, "Brand Co");

    let mut p = product();
    p.vendor = "Acme".to_string();
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    assert_eq!(record.brand, "Acme");
}

#[test]
fn returns_block_requires_policy_url() {
    let p = product();
    let record = map(&p).expect("record");
    assert!(record.returns.is_none());
    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("accepts_returns").is_none());
    assert!(json.get("return_policy").is_none());

    let mut s = settings();
    s.return_policy_url = Some("https://demo.com/policies/refund-policy".to_string());
    s.return_deadline_days = 14;
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["accepts_returns"], true);
    assert_eq!(json["return_deadline_in_days"], 14);
    assert_eq!(json["accepts_exchanges"], true);
    assert_eq!(json["return_policy"], "https://demo.com/policies/refund-policy");
}

#[test]
fn policy_urls_are_omitted_not_null() {
    let json = serde_json::to_value(map(&product()).expect("record")).unwrap();
    assert!(json.get("seller_privacy_policy").is_none());
    assert!(json.get("seller_tos").is_none());
    assert!(json.get("weight").is_none());
    assert!(json.get("color").is_none());
    assert!(json.as_object().unwrap().values().all(|v| !v.is_null()));
}

#[test]
fn geo_fields_fall_back() {
    let p = product();
    let mut s = settings();
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    assert_eq!(record.store_country, "US");
    assert_eq!(record.target_countries, "US");

    s.store_country = None;
    s.target_countries = None;
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    assert_eq!(record.store_country, "CA");
    assert_eq!(record.target_countries, "US");

    let record = map_one(&p, &p.variants[0], &ShopInfo::default(), &s).expect("record");
    assert_eq!(record.store_country, "US");
}

#[test]
fn weight_and_category_pass_through() {
    let mut p = product();
    p.category = "Home & Garden > Kitchen > Mugs".to_string();
    p.variants[0].weight = Some(VariantWeight {
        value: 0.4,
        unit: "KILOGRAMS".to_string(),
    });
    let record = map(&p).expect("record");
    assert_eq!(record.product_category, "Home & Garden > Kitchen > Mugs");
    assert_eq!(record.weight.as_deref(), Some("0.4 kg"));
}

#[test]
fn keys_serialize_in_wire_order() {
    let mut p = product();
    p.variants[0].sku = Some("MUG-01".to_string());
    let mut s = settings();
    s.return_policy_url = Some("https://demo.com/r".to_string());
    let record = map_one(&p, &p.variants[0], &shop(), &s).expect("record");
    let json = serde_json::to_string(&record).unwrap();

    let keys = [
        "enable_search",
        "enable_checkout",
        "\"id\"",
        "mpn",
        "\"title\"",
        "description",
        "\"link\"",
        "condition",
        "product_category",
        "brand",
        "image_link",
        "\"price\"",
        "availability",
        "item_group_id",
        "item_group_title",
        "listing_has_variations",
        "seller_name",
        "seller_url",
        "accepts_returns",
        "return_deadline_in_days",
        "accepts_exchanges",
        "return_policy",
        "target_countries",
        "store_country",
    ];
    let positions: Vec<usize> = keys
        .iter()
        .map(|k| json.find(k).unwrap_or_else(|| panic!("missing {k} in {json}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
}
