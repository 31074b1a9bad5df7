//! Offline unit tests for shopfeed-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::{TimeZone, Utc};
use shopfeed_core::{AppConfig, Environment, FeedSettings};
use shopfeed_db::{CachedFeedRow, FeedSettingsRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        shopify_api_version: "2025-01".to_string(),
        shopify_request_timeout_secs: 30,
        shopify_page_size: 100,
        shopify_max_retries: 3,
        shopify_retry_backoff_base_secs: 2,
        shop_tokens: BTreeMap::new(),
        refresh_cron: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn settings_row_converts_to_domain_settings() {
    let row = FeedSettingsRow {
        id: 1,
        shop: "demo.myshopify.com".to_string(),
        enable_search: false,
        enable_checkout: true,
        seller_name: Some("Demo".to_string()),
        seller_url: None,
        privacy_policy_url: None,
        terms_of_service_url: None,
        return_policy_url: Some("https://demo.com/r".to_string()),
        accepts_returns: true,
        return_deadline_days: 14,
        accepts_exchanges: false,
        store_country: Some("CA".to_string()),
        target_countries: Some("CA,US".to_string()),
        feed_generated_at: None,
        product_count: Some(12),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let settings = FeedSettings::from(row);
    assert!(!settings.enable_search);
    assert!(settings.enable_checkout);
    assert_eq!(settings.return_deadline_days, 14);
    assert_eq!(settings.target_countries.as_deref(), Some("CA,US"));
    assert_eq!(settings.product_count, Some(12));
}

#[test]
fn cached_feed_reports_generation_time_in_millis() {
    let row = CachedFeedRow {
        shop: "demo.myshopify.com".to_string(),
        payload: String::new(),
        record_count: 0,
        generated_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
    };
    assert_eq!(row.generated_at_ms(), 1_700_000_000_123);
}
