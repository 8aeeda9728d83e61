//! Catalogue product model.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Stock level below which a product is flagged as running low.
const LOW_STOCK_THRESHOLD: u32 = 10;

/// A product as listed by `/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub price: Price,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Step a quantity picker by `change`, keeping it within `1..=stock`.
    ///
    /// Out-of-stock products pin the picker at zero.
    #[must_use]
    pub fn clamp_quantity(&self, current: u32, change: i32) -> u32 {
        let stepped = i64::from(current) + i64::from(change);
        let floor = stepped.max(1);
        let clamped = floor.min(i64::from(self.stock));
        u32::try_from(clamped).unwrap_or(0)
    }

    /// Whether the product should be flagged as running low.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub fn headphones(stock: u32) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Noise Cancelling Headphones",
            "category": "Audio",
            "brand": "Sonix",
            "price": 7999,
            "stock": stock,
            "image": "headphones.jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_clamp_quantity_bounds() {
        let product = headphones(3);
        assert_eq!(product.clamp_quantity(1, -1), 1);
        assert_eq!(product.clamp_quantity(2, 1), 3);
        assert_eq!(product.clamp_quantity(3, 1), 3);
        assert_eq!(headphones(0).clamp_quantity(1, 1), 0);
    }

    #[test]
    fn test_low_stock_flag() {
        assert!(headphones(9).is_low_stock());
        assert!(!headphones(10).is_low_stock());
        assert!(!headphones(0).in_stock());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"name":"Cable","price":199.5}"#).unwrap();
        assert_eq!(product.stock, 0);
        assert!(product.description.is_none());
        assert!(product.category.is_empty());
    }
}
