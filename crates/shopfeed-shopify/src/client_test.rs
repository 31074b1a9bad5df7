use super::*;

#[test]
fn bare_domain_gets_https_origin() {
    assert_eq!(
        shop_origin("demo.myshopify.com").unwrap(),
        "https://demo.myshopify.com"
    );
}

#[test]
fn url_is_reduced_to_origin() {
    assert_eq!(
        shop_origin("http://127.0.0.1:4010/some/path").unwrap(),
        "http://127.0.0.1:4010"
    );
}

#[test]
fn endpoint_includes_api_version() {
    assert_eq!(
        graphql_endpoint("demo.myshopify.com", "2025-01").unwrap(),
        "https://demo.myshopify.com/admin/api/2025-01/graphql.json"
    );
}

#[test]
fn rejects_bad_domains() {
    for bad in ["", "   ", "demo.myshopify.com/admin", "demo shop.com", ".demo.com", "http://"] {
        let err = shop_origin(bad).unwrap_err();
        assert!(
            matches!(err, ShopifyError::InvalidShopDomain { .. }),
            "expected InvalidShopDomain for {bad:?}, got {err:?}"
        );
    }
}

#[test]
fn client_builds_with_config_values() {
    let client = ShopifyClient::new(5, "shopfeed-test/0.1", "2025-01", 50, 0, 0).unwrap();
    assert_eq!(client.page_size, 50);
    assert_eq!(client.api_version, "2025-01");
}
