mod feeds;
mod settings;
mod webhooks;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::pipeline::{FailureKind, FeedPipeline, GenerateError, GenerationFailure};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub pipeline: Arc<FeedPipeline>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Header naming the shop on hook deliveries.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Machine-readable error code; each maps to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    FeedNotGenerated,
    BadRequest,
    ValidationError,
    Unauthorized,
    RateLimited,
    UpstreamError,
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            Self::NotFound | Self::FeedNotGenerated => StatusCode::NOT_FOUND,
            Self::BadRequest | Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_latency_ms: Option<u64>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.error.code.status(), Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &shopfeed_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, ErrorCode::InternalError, "database query failed")
}

pub(super) fn map_generate_error(request_id: String, error: &GenerateError) -> ApiError {
    match error {
        GenerateError::MissingToken(_) => {
            ApiError::new(request_id, ErrorCode::NotFound, error.to_string())
        }
        GenerateError::Shopify(e) => {
            tracing::error!(error = %e, "shopify request failed");
            ApiError::new(request_id, ErrorCode::UpstreamError, e.to_string())
        }
        GenerateError::Db(e) => map_db_error(request_id, e),
        GenerateError::Feed(e) => {
            tracing::error!(error = %e, "feed serialization failed");
            ApiError::new(
                request_id,
                ErrorCode::InternalError,
                "feed serialization failed",
            )
        }
    }
}

/// Status for a failed generation. The pipeline has already logged it.
pub(super) fn map_generation_failure(request_id: String, failure: GenerationFailure) -> ApiError {
    match failure.kind {
        FailureKind::MissingToken => {
            ApiError::new(request_id, ErrorCode::NotFound, failure.reason)
        }
        FailureKind::Upstream => {
            ApiError::new(request_id, ErrorCode::UpstreamError, failure.reason)
        }
        FailureKind::Store => {
            ApiError::new(request_id, ErrorCode::InternalError, "feed could not be stored")
        }
        FailureKind::Serialize => {
            ApiError::new(request_id, ErrorCode::InternalError, "feed serialization failed")
        }
    }
}

/// Rejects shop identifiers the Admin API client would refuse.
pub(super) fn validate_shop(request_id: &str, shop: &str) -> Result<(), ApiError> {
    shopfeed_shopify::client::shop_origin(shop)
        .map(|_| ())
        .map_err(|e| ApiError::new(request_id, ErrorCode::ValidationError, e.to_string()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(SHOP_DOMAIN_HEADER),
        ])
}

fn feed_router() -> Router<AppState> {
    Router::new()
        .route("/feeds/{shop}", get(feeds::get_feed))
        .layer(CompressionLayer::new().gzip(true))
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/shops/{shop}/settings",
            get(settings::get_settings).patch(settings::update_settings),
        )
        .route(
            "/api/v1/shops/{shop}/settings/sync",
            post(settings::sync_settings),
        )
        .route(
            "/api/v1/shops/{shop}/feed/generate",
            post(feeds::generate_feed),
        )
        .route(
            "/webhooks/products/{topic}",
            post(webhooks::product_changed),
        )
        .route("/webhooks/app/uninstalled", post(webhooks::app_uninstalled))
        .layer(
            // Auth runs first so the limiter keys on the authenticated key.
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .merge(feed_router());

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    let (status, data) = match shopfeed_db::health_check(&state.pool).await {
        Ok(latency) => (
            StatusCode::OK,
            HealthData {
                status: "ok",
                database: "ok",
                database_latency_ms: u64::try_from(latency.as_millis()).ok(),
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthData {
                    status: "degraded",
                    database: "unavailable",
                    database_latency_ms: None,
                },
            )
        }
    };
    (status, Json(ApiResponse { data, meta }))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests;
