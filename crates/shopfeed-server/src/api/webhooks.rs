//! Catalog-change and uninstall hooks.
//!
//! The shop is named by the `X-Shopify-Shop-Domain` header. Product hooks
//! acknowledge immediately and regenerate in a background task.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Serialize;

use super::{
    map_db_error, validate_shop, ApiError, ApiResponse, AppState, ErrorCode, ResponseMeta,
    SHOP_DOMAIN_HEADER,
};
use crate::middleware::RequestId;

const PRODUCT_TOPICS: [&str; 3] = ["create", "update", "delete"];

#[derive(Debug, Serialize)]
pub(super) struct HookAck {
    shop: String,
    action: &'static str,
}

fn shop_from_headers(rid: &str, headers: &HeaderMap) -> Result<String, ApiError> {
    let shop = headers
        .get(SHOP_DOMAIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                rid,
                ErrorCode::BadRequest,
                "missing X-Shopify-Shop-Domain header",
            )
        })?;
    validate_shop(rid, shop)?;
    Ok(shop.to_owned())
}

/// POST /webhooks/products/:topic: schedule a regeneration.
pub(super) async fn product_changed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(topic): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ApiResponse<HookAck>>), ApiError> {
    let rid = &req_id.0;
    if !PRODUCT_TOPICS.contains(&topic.as_str()) {
        return Err(ApiError::new(
            rid,
            ErrorCode::NotFound,
            format!("unknown product topic: {topic}"),
        ));
    }
    let shop = shop_from_headers(rid, &headers)?;

    tracing::info!(shop = %shop, topic = %topic, "catalog change received");
    let pipeline = Arc::clone(&state.pipeline);
    let task_shop = shop.clone();
    tokio::spawn(async move {
        // Failures are logged inside generate.
        let _ = pipeline.generate(&task_shop).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: HookAck {
                shop,
                action: "generate_scheduled",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// POST /webhooks/app/uninstalled: drop everything stored for the shop.
pub(super) async fn app_uninstalled(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<HookAck>>, ApiError> {
    let rid = &req_id.0;
    let shop = shop_from_headers(rid, &headers)?;

    state
        .pipeline
        .remove_shop(&shop)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(shop = %shop, "shop uninstalled");
    Ok(Json(ApiResponse {
        data: HookAck {
            shop,
            action: "deleted",
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
