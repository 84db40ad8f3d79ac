//! Catalog repository.
//!
//! Read-only access to the externally managed product catalog and static
//! assets. Queries use runtime `query_as` with explicit row types.

use sqlx::PgPool;

use deco_select_core::{AssetId, ProductId};

use super::RepositoryError;
use crate::models::{Product, StaticAsset};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    model_number: String,
    product_type: String,
    style: Option<String>,
    preset: String,
    is_default: bool,
    main_image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            model_number: row.model_number,
            product_type: row.product_type,
            style: row.style,
            preset: row.preset,
            is_default: row.is_default,
            main_image_url: row.main_image_url,
        }
    }
}

/// Internal row type for static asset queries.
#[derive(Debug, sqlx::FromRow)]
struct StaticAssetRow {
    id: i32,
    file_name: String,
    image_url: String,
}

impl From<StaticAssetRow> for StaticAsset {
    fn from(row: StaticAssetRow) -> Self {
        Self {
            id: AssetId::new(row.id),
            file_name: row.file_name,
            image_url: row.image_url,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, model_number, product_type, style, preset, is_default, main_image_url";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a product by its model number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_model_number(
        &self,
        model_number: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE model_number = $1"
        ))
        .bind(model_number)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List products filtered by type and/or style.
    ///
    /// Each provided filter is a case-insensitive exact match; absent filters
    /// match everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        product_type: Option<&str>,
        style: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM product
            WHERE ($1::text IS NULL OR LOWER(product_type) = LOWER($1))
              AND ($2::text IS NULL OR LOWER(style) = LOWER($2))
            ORDER BY id
            "
        ))
        .bind(product_type)
        .bind(style)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a static asset by its file name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_asset_by_name(
        &self,
        file_name: &str,
    ) -> Result<Option<StaticAsset>, RepositoryError> {
        let row = sqlx::query_as::<_, StaticAssetRow>(
            "SELECT id, file_name, image_url FROM static_asset WHERE file_name = $1",
        )
        .bind(file_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
