//! Catalog entities.

use serde::Serialize;

use deco_select_core::{AssetId, ProductId};

/// A configurable product in the catalog.
///
/// The catalog is managed externally; this service only reads it. Rows are
/// looked up by id or model number and filtered by type/style.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    /// Manufacturer model number (e.g. "GL-2000")
    pub model_number: String,
    /// Product category, matched exactly by the analytics filter
    pub product_type: String,
    /// Visual style, optional
    pub style: Option<String>,
    /// Preset configuration name
    pub preset: String,
    /// Whether this is the default configuration for its model
    #[serde(rename = "default")]
    pub is_default: bool,
    /// URL of the main product image, if one is set
    pub main_image_url: Option<String>,
}

/// A named static asset (image) served to the mini-program.
#[derive(Debug, Clone, Serialize)]
pub struct StaticAsset {
    pub id: AssetId,
    pub file_name: String,
    pub image_url: String,
}
