//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use deco_select_core::ProductId;

use super::ApiResponse;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Query parameters for detail-by-model-number.
///
/// The mini-program client has always sent the model number under `type`;
/// the name is kept for compatibility.
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    #[serde(rename = "type")]
    pub model_number: Option<String>,
}

/// `GET /api/products?type=<model_number>`
pub async fn detail_by_model_number(
    State(state): State<AppState>,
    Query(params): Query<DetailParams>,
) -> Result<Json<ApiResponse<Product>>> {
    let model_number = params
        .model_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("type 参数必填".to_string()))?;

    let product = ProductRepository::new(state.pool())
        .get_by_model_number(model_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(ApiResponse::ok(product)))
}

/// `GET /api/products/{id}`
pub async fn detail_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(ApiResponse::ok(product)))
}

/// Query parameters for the product search.
///
/// Accepts the historical capitalised parameter names as aliases.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "ProductType", alias = "productType")]
    pub product_type: Option<String>,
    #[serde(alias = "Style")]
    pub style: Option<String>,
}

/// Search result payload.
#[derive(Debug, Serialize)]
pub struct ModelList {
    #[serde(rename = "modelList")]
    pub model_list: Vec<ModelEntry>,
}

/// One search hit, trimmed to what the configurator screen renders.
#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub id: ProductId,
    pub model_number: String,
    pub main_image: Option<String>,
    pub preset: String,
    pub default: bool,
}

impl From<Product> for ModelEntry {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            model_number: product.model_number,
            main_image: product.main_image_url,
            preset: product.preset,
            default: product.is_default,
        }
    }
}

/// `GET /api/product_search?product_type=&style=`
///
/// Each provided filter is a case-insensitive exact match.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<ModelList>>> {
    let product_type = params
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let style = params
        .style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let products = ProductRepository::new(state.pool())
        .search(product_type, style)
        .await?;

    let model_list = products.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::ok(ModelList { model_list })))
}

/// Query parameters for the static asset lookup.
#[derive(Debug, Deserialize)]
pub struct AssetParams {
    pub file_name: Option<String>,
}

/// Static asset payload.
#[derive(Debug, Serialize)]
pub struct AssetData {
    pub file_name: String,
    pub image_url: String,
}

/// `GET /api/static_asset?file_name=`
pub async fn static_asset(
    State(state): State<AppState>,
    Query(params): Query<AssetParams>,
) -> Result<Json<ApiResponse<AssetData>>> {
    let file_name = params
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("file_name 参数必填".to_string()))?;

    let asset = ProductRepository::new(state.pool())
        .get_asset_by_name(file_name)
        .await?
        .ok_or_else(|| AppError::NotFound("未找到该静态资源".to_string()))?;

    Ok(Json(ApiResponse::ok(AssetData {
        file_name: asset.file_name,
        image_url: asset.image_url,
    })))
}
