//! Selection events and their product snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use deco_select_core::{ProductId, SelectionId};

use super::Product;

/// A denormalized copy of product fields, taken when a selection is recorded.
///
/// The snapshot is a point-in-time fact: it never changes, even if the source
/// product is later edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub model_number: String,
    pub product_type: String,
    pub style: Option<String>,
    pub preset: String,
    pub is_default: bool,
}

impl SelectionSnapshot {
    /// Capture a snapshot of a product's current fields.
    #[must_use]
    pub fn capture(product: &Product) -> Self {
        Self {
            model_number: product.model_number.clone(),
            product_type: product.product_type.clone(),
            style: product.style.clone(),
            preset: product.preset.clone(),
            is_default: product.is_default,
        }
    }
}

/// One recorded user selection.
///
/// Created exactly once, never updated. `product_id` is nullable only to
/// tolerate historical backfill rows; new writes always set it.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionEvent {
    pub id: SelectionId,
    pub user_id: i64,
    pub product_id: Option<ProductId>,
    /// Assigned by the store at commit time
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: SelectionSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(1),
            model_number: "GL-2000".to_string(),
            product_type: "乘客电梯".to_string(),
            style: Some("现代".to_string()),
            preset: "标配".to_string(),
            is_default: true,
            main_image_url: None,
        }
    }

    #[test]
    fn test_capture_copies_all_fields() {
        let product = sample_product();
        let snapshot = SelectionSnapshot::capture(&product);

        assert_eq!(snapshot.model_number, "GL-2000");
        assert_eq!(snapshot.product_type, "乘客电梯");
        assert_eq!(snapshot.style.as_deref(), Some("现代"));
        assert_eq!(snapshot.preset, "标配");
        assert!(snapshot.is_default);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_product_edits() {
        let mut product = sample_product();
        let snapshot = SelectionSnapshot::capture(&product);

        product.model_number = "GL-3000".to_string();
        product.style = None;
        product.is_default = false;

        assert_eq!(snapshot.model_number, "GL-2000");
        assert_eq!(snapshot.style.as_deref(), Some("现代"));
        assert!(snapshot.is_default);
    }
}
