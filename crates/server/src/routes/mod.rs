//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (verifies database)
//!
//! # Catalog
//! GET  /api/products?type=<model>    - Product detail by model number
//! GET  /api/products/{id}            - Product detail by id
//! GET  /api/product_search           - Filter by product_type / style
//! GET  /api/static_asset?file_name=  - Static asset lookup
//!
//! # Selections
//! POST /api/save_user_selection      - Record a selection (with snapshot)
//! GET  /api/user_selection_summary   - Top-N selected products in a window
//!
//! # Auth
//! POST /api/login                    - Exchange a login code, look up user
//! POST /api/register                 - Register with code + phone code
//! ```
//!
//! Responses use the `{code, msg, data}` envelope the mini-program client
//! expects; login/register return their `{success, msg, ...}` bodies with
//! HTTP 200 and the client branches on `success`.

pub mod auth;
pub mod products;
pub mod selections;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// JSON response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response with a payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            msg: "获取成功".to_string(),
            data: Some(data),
        }
    }

    /// Error response with no payload.
    pub fn error(code: u16, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::detail_by_model_number))
        .route("/api/products/{id}", get(products::detail_by_id))
        .route("/api/product_search", get(products::search))
        .route("/api/static_asset", get(products::static_asset))
        .route("/api/save_user_selection", post(selections::save))
        .route("/api/user_selection_summary", get(selections::summary))
        .route("/api/login", post(auth::login))
        .route("/api/register", post(auth::register))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["msg"], "获取成功");
        assert_eq!(json["data"]["id"], 1);
    }

    #[test]
    fn test_envelope_error_has_null_data() {
        let resp = ApiResponse::<()>::error(404, "Product not found");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["msg"], "Product not found");
        assert!(json["data"].is_null());
    }
}
