//! Selection recording and analytics route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use deco_select_core::ProductId;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::models::SelectionEvent;
use crate::services::analytics::{self, SummaryParams, TopProducts};
use crate::services::selections;
use crate::state::AppState;

/// Request body for recording a selection.
#[derive(Debug, Deserialize)]
pub struct SaveSelectionRequest {
    pub user_id: Option<i64>,
    pub product_id: Option<i32>,
}

/// `POST /api/save_user_selection`
pub async fn save(
    State(state): State<AppState>,
    Json(body): Json<SaveSelectionRequest>,
) -> Result<Json<ApiResponse<SelectionEvent>>> {
    let user_id = body
        .user_id
        .ok_or_else(|| AppError::Validation("user_id 参数必填".to_string()))?;
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::Validation("product_id 参数必填".to_string()))?;

    let event = selections::record_selection(state.pool(), user_id, ProductId::new(product_id)).await?;

    Ok(Json(ApiResponse::ok(event)))
}

/// `GET /api/user_selection_summary`
///
/// All parameters are optional with lenient fallbacks; an empty window is a
/// successful, empty summary.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<ApiResponse<TopProducts>>> {
    let summary = analytics::top_products(state.pool(), &params).await?;

    Ok(Json(ApiResponse::ok(summary)))
}
