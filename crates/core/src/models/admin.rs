//! Back-office reports and the product editor form.

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::Price;
use crate::validation::{ValidationError, required};

/// `GET /admin/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_revenue: Price,
}

/// One category of `GET /admin/stock/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub category: String,
    #[serde(default)]
    pub total_stock: u64,
    #[serde(default)]
    pub product_count: u64,
}

/// Product editor fields, sent as multipart text parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: Price,
    pub stock: u32,
    pub rating: f64,
}

impl ProductForm {
    /// Rating a new product starts with.
    pub const DEFAULT_RATING: f64 = 4.0;

    /// A blank form with the default rating.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            brand: String::new(),
            price,
            stock,
            rating: Self::DEFAULT_RATING,
        }
    }

    /// Validate and return the multipart text parts in submission order.
    ///
    /// # Errors
    ///
    /// Returns `Required` for a blank name, category, or brand, and
    /// `NegativePrice` for a price below zero.
    pub fn parts(&self) -> Result<Vec<(&'static str, String)>, ValidationError> {
        let name = required(&self.name, "Name")?;
        let category = required(&self.category, "Category")?;
        let brand = required(&self.brand, "Brand")?;
        if self.price.amount().is_sign_negative() && !self.price.amount().is_zero() {
            return Err(ValidationError::NegativePrice);
        }
        Ok(vec![
            ("name", name),
            ("description", self.description.trim().to_string()),
            ("category", category),
            ("brand", brand),
            ("price", self.price.amount().normalize().to_string()),
            ("stock", self.stock.to_string()),
            ("rating", self.rating.to_string()),
        ])
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: product.price,
            stock: product.stock,
            rating: product.rating.unwrap_or(Self::DEFAULT_RATING),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_dashboard_defaults_missing_fields() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"totalOrders": 7, "totalRevenue": 125000.5}"#).unwrap();
        assert_eq!(stats.total_orders, 7);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_revenue.to_string(), "₹1,25,000.5");
    }

    #[test]
    fn test_form_parts() {
        let mut form = ProductForm::new(" Smart Watch ", Price::from_rupees(12999), 25);
        form.category = "Wearables".into();
        form.brand = "Pulse".into();

        let parts = form.parts().unwrap();
        assert_eq!(parts.first().unwrap(), &("name", "Smart Watch".to_string()));
        assert!(parts.contains(&("price", "12999".to_string())));
        assert!(parts.contains(&("rating", "4".to_string())));
        assert!(parts.contains(&("stock", "25".to_string())));
    }

    #[test]
    fn test_form_rejects_blank_and_negative() {
        let form = ProductForm::new("Watch", Price::from_rupees(10), 1);
        assert_eq!(form.parts(), Err(ValidationError::Required("Category")));

        let mut form = ProductForm::new("Watch", Price::new(Decimal::new(-1, 0)), 1);
        form.category = "Wearables".into();
        form.brand = "Pulse".into();
        assert_eq!(form.parts(), Err(ValidationError::NegativePrice));
    }

    #[test]
    fn test_form_from_product() {
        let form = ProductForm::from(&crate::models::product::tests::headphones(3));
        assert_eq!(form.brand, "Sonix");
        assert!((form.rating - ProductForm::DEFAULT_RATING).abs() < f64::EPSILON);
    }
}
