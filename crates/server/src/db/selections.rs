//! Selection event repository.
//!
//! The `user_selection` table is append-only: events are inserted exactly
//! once and never updated. Timestamps are assigned by `PostgreSQL` at commit
//! time, so they are monotonically non-decreasing in write order per writer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use deco_select_core::{ProductId, SelectionId};

use super::RepositoryError;
use crate::models::{SelectionEvent, SelectionSnapshot};

/// Internal row type for the insert's RETURNING clause.
#[derive(Debug, sqlx::FromRow)]
struct InsertedRow {
    id: i32,
    selected_at: DateTime<Utc>,
}

/// One product's aggregate over a query window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionGroup {
    pub product_id: ProductId,
    /// Number of selection events for this product in the window
    pub count: i64,
    /// Most recent selection timestamp in the window
    pub last_time: DateTime<Utc>,
}

/// Internal row type for aggregation queries.
#[derive(Debug, sqlx::FromRow)]
struct SelectionGroupRow {
    product_id: i32,
    sel_count: i64,
    last_time: DateTime<Utc>,
}

impl From<SelectionGroupRow> for SelectionGroup {
    fn from(row: SelectionGroupRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            count: row.sel_count,
            last_time: row.last_time,
        }
    }
}

/// Repository for selection event writes and aggregate reads.
pub struct SelectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SelectionRepository<'a> {
    /// Create a new selection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one selection event with its snapshot.
    ///
    /// The insert is a single statement; the store assigns `id` and
    /// `selected_at` at commit time. No multi-event transactions exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        user_id: i64,
        product_id: ProductId,
        snapshot: &SelectionSnapshot,
    ) -> Result<SelectionEvent, RepositoryError> {
        let row = sqlx::query_as::<_, InsertedRow>(
            r"
            INSERT INTO user_selection
                (user_id, product_id,
                 snapshot_model_number, snapshot_product_type, snapshot_style,
                 snapshot_preset, snapshot_is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, selected_at
            ",
        )
        .bind(user_id)
        .bind(product_id.as_i32())
        .bind(&snapshot.model_number)
        .bind(&snapshot.product_type)
        .bind(snapshot.style.as_deref())
        .bind(&snapshot.preset)
        .bind(snapshot.is_default)
        .fetch_one(self.pool)
        .await?;

        Ok(SelectionEvent {
            id: SelectionId::new(row.id),
            user_id,
            product_id: Some(product_id),
            timestamp: row.selected_at,
            snapshot: snapshot.clone(),
        })
    }

    /// Group selection events in `[start, end]` by product.
    ///
    /// Rows with a NULL `product_id` (historical backfill) are excluded. When
    /// `product_type` is given, only events whose *snapshot* type equals it
    /// exactly (case-sensitive) are included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn aggregate_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        product_type: Option<&str>,
    ) -> Result<Vec<SelectionGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, SelectionGroupRow>(
            r"
            SELECT product_id, COUNT(*) AS sel_count, MAX(selected_at) AS last_time
            FROM user_selection
            WHERE selected_at >= $1
              AND selected_at <= $2
              AND product_id IS NOT NULL
              AND ($3::text IS NULL OR snapshot_product_type = $3)
            GROUP BY product_id
            ",
        )
        .bind(start)
        .bind(end)
        .bind(product_type)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
