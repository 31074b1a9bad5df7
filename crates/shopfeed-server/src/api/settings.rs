use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use shopfeed_core::{FeedSettings, SettingsPatch};

use super::{
    map_db_error, map_generate_error, validate_shop, ApiError, ApiResponse, AppState, ErrorCode,
    ResponseMeta,
};
use crate::middleware::RequestId;

/// GET /api/v1/shops/:shop/settings: current settings, created with
/// defaults on first read.
pub(super) async fn get_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(shop): Path<String>,
) -> Result<Json<ApiResponse<FeedSettings>>, ApiError> {
    validate_shop(&req_id.0, &shop)?;

    let settings = shopfeed_db::get_or_create_settings(&state.pool, &shop)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: settings,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/shops/:shop/settings: sparse update. Absent fields are
/// untouched; `null` clears an optional field.
pub(super) async fn update_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(shop): Path<String>,
    body: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<FeedSettings>>, ApiError> {
    let rid = &req_id.0;
    validate_shop(rid, &shop)?;

    let Json(patch) =
        body.map_err(|e| ApiError::new(rid, ErrorCode::ValidationError, e.body_text()))?;

    if patch.return_deadline_days.is_some_and(|days| days < 0) {
        return Err(ApiError::new(
            rid,
            ErrorCode::ValidationError,
            "return_deadline_days must not be negative",
        ));
    }

    shopfeed_db::update_settings(&state.pool, &shop, &patch)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let settings = shopfeed_db::get_or_create_settings(&state.pool, &shop)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(shop = %shop, "settings updated");
    Ok(Json(ApiResponse {
        data: settings,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/shops/:shop/settings/sync: re-pull shop info and policies.
pub(super) async fn sync_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(shop): Path<String>,
) -> Result<Json<ApiResponse<FeedSettings>>, ApiError> {
    validate_shop(&req_id.0, &shop)?;

    let settings = state
        .pipeline
        .auto_populate(&shop)
        .await
        .map_err(|e| map_generate_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: settings,
        meta: ResponseMeta::new(req_id.0),
    }))
}
