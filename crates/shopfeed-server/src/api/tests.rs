use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use chrono::{TimeZone, Utc};
use shopfeed_shopify::ShopifyClient;
use tower::ServiceExt;

use super::*;

const SHOP: &str = "demo.myshopify.com";

fn test_app_with_auth(pool: PgPool, auth: AuthState) -> Router {
    test_app_with_limits(pool, auth, default_rate_limit_state())
}

fn test_app_with_limits(pool: PgPool, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let client = ShopifyClient::new(5, "shopfeed-test/0.1", "2025-01", 50, 0, 0)
        .expect("test client");
    let pipeline = Arc::new(FeedPipeline::new(
        pool.clone(),
        Arc::new(client),
        BTreeMap::new(),
    ));
    build_app(AppState { pool, pipeline }, auth, rate_limit)
}

fn test_app(pool: PgPool) -> Router {
    let auth = AuthState::from_raw("", true).expect("auth");
    test_app_with_auth(pool, auth)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        (ErrorCode::ValidationError, StatusCode::BAD_REQUEST),
        (ErrorCode::FeedNotGenerated, StatusCode::NOT_FOUND),
        (ErrorCode::UpstreamError, StatusCode::BAD_GATEWAY),
        (ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED),
        (ErrorCode::RateLimited, StatusCode::TOO_MANY_REQUESTS),
        (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "{code:?}");
    }
}

#[test]
fn error_codes_serialize_snake_case() {
    let json = serde_json::to_value(ApiError::new("req-1", ErrorCode::FeedNotGenerated, "m"))
        .expect("serialize");
    assert_eq!(json["error"]["code"], "feed_not_generated");
    assert_eq!(json["meta"]["request_id"], "req-1");
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_database_ok(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["data"]["database_latency_ms"].is_u64());
}

#[sqlx::test(migrations = "../../migrations")]
async fn feed_not_generated_is_distinct_404(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(get_request(&format!("/feeds/{SHOP}")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "feed_not_generated");
}

#[sqlx::test(migrations = "../../migrations")]
async fn feed_is_served_with_metadata_headers(pool: PgPool) {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
    let payload = "{\"id\":\"a\"}\n{\"id\":\"b\"}";
    shopfeed_db::get_or_create_settings(&pool, SHOP)
        .await
        .expect("settings");
    shopfeed_db::replace_feed(&pool, SHOP, payload, 2, generated_at)
        .await
        .expect("seed feed");

    let response = test_app(pool)
        .oneshot(get_request(&format!("/feeds/{SHOP}")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/x-ndjson");
    assert_eq!(headers["x-feed-record-count"], "2");
    assert_eq!(
        headers["x-feed-generated-at"],
        generated_at.timestamp_millis().to_string().as_str()
    );
    assert_eq!(
        headers[header::LAST_MODIFIED],
        "Sun, 01 Mar 2026 12:30:00 GMT"
    );

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body, payload.as_bytes());
}

#[sqlx::test(migrations = "../../migrations")]
async fn feed_is_gzipped_when_requested(pool: PgPool) {
    let line = "{\"id\":\"sku\",\"title\":\"A long enough title to compress\"}";
    let payload = vec![line; 20].join("\n");
    shopfeed_db::get_or_create_settings(&pool, SHOP)
        .await
        .expect("settings");
    shopfeed_db::replace_feed(&pool, SHOP, &payload, 20, Utc::now())
        .await
        .expect("seed feed");

    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .uri(format!("/feeds/{SHOP}"))
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    assert_eq!(response.headers()["x-feed-record-count"], "20");
}

#[sqlx::test(migrations = "../../migrations")]
async fn feed_rejects_invalid_shop(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(get_request("/feeds/bad%20shop"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn settings_get_creates_defaults(pool: PgPool) {
    let response = test_app(pool.clone())
        .oneshot(get_request(&format!("/api/v1/shops/{SHOP}/settings")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["shop"], SHOP);
    assert_eq!(json["data"]["enable_search"], true);
    assert_eq!(json["data"]["return_deadline_days"], 30);
    assert!(shopfeed_db::get_settings(&pool, SHOP)
        .await
        .expect("get")
        .is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn settings_patch_updates_only_given_fields(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/shops/{SHOP}/settings"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"enable_checkout":true,"seller_name":"Brand Co"}"#,
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["enable_checkout"], true);
    assert_eq!(json["data"]["seller_name"], "Brand Co");
    assert_eq!(json["data"]["enable_search"], true);
    assert_eq!(json["data"]["store_country"], "US");
}

#[sqlx::test(migrations = "../../migrations")]
async fn settings_patch_rejects_bad_input(pool: PgPool) {
    for body in [
        r#"{"return_deadline_days":-1}"#,
        r#"{"not_a_setting":true}"#,
        r#"{"enable_search":"yes"}"#,
    ] {
        let response = test_app(pool.clone())
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/v1/shops/{SHOP}/settings"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn protected_routes_require_bearer_when_enabled(pool: PgPool) {
    let auth = AuthState::from_raw("secret", false).expect("auth");
    let app = test_app_with_auth(pool, auth);

    let denied = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/shops/{SHOP}/settings")))
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/shops/{SHOP}/settings"))
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(allowed.status(), StatusCode::OK);

    // The feed itself stays public.
    let feed = app
        .oneshot(get_request(&format!("/feeds/{SHOP}")))
        .await
        .expect("response");
    assert_eq!(feed.status(), StatusCode::NOT_FOUND);
}

#[test]
fn generation_failures_map_by_kind() {
    let failure = |kind| GenerationFailure {
        shop: SHOP.to_owned(),
        kind,
        reason: "password=hunter2 in connection string".to_owned(),
    };
    let cases = [
        (FailureKind::MissingToken, StatusCode::NOT_FOUND),
        (FailureKind::Upstream, StatusCode::BAD_GATEWAY),
        (FailureKind::Store, StatusCode::INTERNAL_SERVER_ERROR),
        (FailureKind::Serialize, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (kind, status) in cases {
        let error = map_generation_failure("req-1".to_owned(), failure(kind));
        assert_eq!(error.error.code.status(), status, "{kind:?}");
    }

    let store = map_generation_failure("req-1".to_owned(), failure(FailureKind::Store));
    assert!(!store.error.message.contains("hunter2"), "store details stay in logs");
}

#[sqlx::test(migrations = "../../migrations")]
async fn manual_generate_without_token_is_not_found(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/shops/{SHOP}/feed/generate"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains(SHOP)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn rate_limit_ignores_rotating_shop_header(pool: PgPool) {
    let auth = AuthState::from_raw("secret", false).expect("auth");
    let limiter = RateLimitState::new(2, Duration::from_secs(60));
    let app = test_app_with_limits(pool, auth, limiter.clone());

    let request = |shop_header: String, token: &str| {
        Request::builder()
            .uri(format!("/api/v1/shops/{SHOP}/settings"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(SHOP_DOMAIN_HEADER, shop_header)
            .body(Body::empty())
            .expect("request")
    };

    let mut statuses = Vec::new();
    for i in 0..4 {
        let response = app
            .clone()
            .oneshot(request(format!("shop-{i}.myshopify.com"), "secret"))
            .await
            .expect("response");
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            assert!(response.headers().contains_key(header::RETRY_AFTER));
            let json = json_body(response).await;
            assert_eq!(json["error"]["code"], "rate_limited");
            statuses.push(StatusCode::TOO_MANY_REQUESTS);
        } else {
            statuses.push(response.status());
        }
    }
    assert_eq!(
        statuses,
        [
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );

    // Rejected credentials never reach the limiter.
    for i in 0..10 {
        let response = app
            .clone()
            .oneshot(request(format!("spam-{i}.myshopify.com"), "wrong"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(limiter.tracked().await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_hook_is_acknowledged_immediately(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/products/update")
                .header("X-Shopify-Shop-Domain", SHOP)
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["data"]["shop"], SHOP);
    assert_eq!(json["data"]["action"], "generate_scheduled");
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_hook_validates_topic_and_shop(pool: PgPool) {
    let app = test_app(pool);

    let unknown_topic = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/products/publish")
                .header("X-Shopify-Shop-Domain", SHOP)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(unknown_topic.status(), StatusCode::NOT_FOUND);

    let missing_shop = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/products/create")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing_shop.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn uninstall_hook_removes_shop_data(pool: PgPool) {
    shopfeed_db::get_or_create_settings(&pool, SHOP)
        .await
        .expect("settings");
    shopfeed_db::replace_feed(&pool, SHOP, "", 0, Utc::now())
        .await
        .expect("feed");

    let response = test_app(pool.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/app/uninstalled")
                .header("X-Shopify-Shop-Domain", SHOP)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(shopfeed_db::read_feed(&pool, SHOP)
        .await
        .expect("read")
        .is_none());
    assert!(shopfeed_db::get_settings(&pool, SHOP)
        .await
        .expect("get")
        .is_none());
}
