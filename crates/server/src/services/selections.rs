//! Snapshot writer: records a user's product choice.

use sqlx::PgPool;
use tracing::instrument;

use deco_select_core::ProductId;

use crate::db::{ProductRepository, SelectionRepository};
use crate::error::AppError;
use crate::models::{SelectionEvent, SelectionSnapshot};

/// Record one selection event for `user_id`.
///
/// The product's fields are copied into the event at write time; the event is
/// a point-in-time fact, immune to later catalog edits. The write is a single
/// insert, so a failed catalog lookup leaves nothing behind.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist, or
/// `AppError::Database` if a query fails.
#[instrument(skip(pool))]
pub async fn record_selection(
    pool: &PgPool,
    user_id: i64,
    product_id: ProductId,
) -> Result<SelectionEvent, AppError> {
    let product = ProductRepository::new(pool)
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let snapshot = SelectionSnapshot::capture(&product);

    let event = SelectionRepository::new(pool)
        .insert(user_id, product_id, &snapshot)
        .await?;

    tracing::debug!(
        selection_id = %event.id,
        user_id,
        product_id = %product_id,
        "Selection recorded"
    );

    Ok(event)
}
