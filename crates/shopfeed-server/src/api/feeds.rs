use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::{
    map_db_error, map_generation_failure, validate_shop, ApiError, ApiResponse, AppState,
    ErrorCode, ResponseMeta,
};
use crate::middleware::RequestId;
use crate::pipeline::GenerationSummary;

const NDJSON: &str = "application/x-ndjson";
const RECORD_COUNT: HeaderName = HeaderName::from_static("x-feed-record-count");
const GENERATED_AT: HeaderName = HeaderName::from_static("x-feed-generated-at");
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Serves the cached feed for `shop`.
///
/// Gzip is negotiated by the compression layer on this route.
pub(super) async fn get_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(shop): Path<String>,
) -> Result<Response, ApiError> {
    validate_shop(&req_id.0, &shop)?;

    let row = state
        .pipeline
        .read(&shop)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                ErrorCode::FeedNotGenerated,
                format!("no feed has been generated for {shop} yet"),
            )
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(NDJSON));
    headers.insert(RECORD_COUNT, HeaderValue::from(row.record_count));
    headers.insert(GENERATED_AT, HeaderValue::from(row.generated_at_ms()));
    if let Ok(value) = HeaderValue::from_str(&row.generated_at.format(HTTP_DATE).to_string()) {
        headers.insert(header::LAST_MODIFIED, value);
    }

    Ok((StatusCode::OK, headers, row.payload).into_response())
}

/// Regenerates `shop`'s feed and waits for the result.
pub(super) async fn generate_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(shop): Path<String>,
) -> Result<Json<ApiResponse<GenerationSummary>>, ApiError> {
    validate_shop(&req_id.0, &shop)?;

    let summary = state
        .pipeline
        .generate(&shop)
        .await
        .map_err(|failure| map_generation_failure(req_id.0.clone(), failure))?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
