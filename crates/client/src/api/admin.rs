//! Back-office endpoints under `/admin`.
//!
//! The backend restricts all of these to ADMIN accounts; the client does not
//! check the role before calling.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use techmart_core::{
    DashboardStats, ItemCondition, Order, OrderId, Product, ProductForm, ProductId, StatusUpdate,
    StockSummary, UserSummary, ValidationError,
};

use super::{ApiClient, ApiError};

/// An image file attached to the product editor.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ApiClient {
    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the form is incomplete or the request fails.
    #[instrument(skip(self, form, image), fields(name = %form.name))]
    pub async fn add_product(
        &self,
        form: &ProductForm,
        image: Option<ProductImage>,
    ) -> Result<(), AdminRequestError> {
        let form = product_multipart(form, image)?;
        Ok(self
            .send_multipart(Method::POST, "/admin/products", form)
            .await?)
    }

    /// Replace a product's fields, and its image when one is given.
    ///
    /// # Errors
    ///
    /// Returns error if the form is incomplete or the request fails.
    #[instrument(skip(self, form, image), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        form: &ProductForm,
        image: Option<ProductImage>,
    ) -> Result<(), AdminRequestError> {
        let form = product_multipart(form, image)?;
        Ok(self
            .send_multipart(Method::PUT, &format!("/admin/products/{id}"), form)
            .await?)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/admin/products/{id}"), &[])
            .await
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Stock totals per category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn stock_summary(&self) -> Result<Vec<StockSummary>, ApiError> {
        self.get("/admin/stock/summary", &[]).await
    }

    /// Products of one category with their stock.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn stock_by_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        self.get(&format!("/admin/stock/category/{category}"), &[])
            .await
    }

    /// Overwrite a product's stock level.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_stock(&self, product_id: ProductId, stock: u32) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/admin/stock/{product_id}"),
            &[("stock", stock.to_string())],
        )
        .await
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Headline numbers.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/dashboard", &[]).await
    }

    /// Every order in the shop.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/admin/orders", &[]).await
    }

    /// Every registered user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.get("/admin/users", &[]).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Record payment for a prepaid or delivered cash-on-delivery order.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the change.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn confirm_payment(&self, id: OrderId) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/admin/orders/{id}/confirm-payment"),
            &[],
        )
        .await
    }

    /// Move an order along the fulfilment pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self, update), fields(order_id = %id, status = %update.status))]
    pub async fn update_order_status(&self, id: OrderId, update: &StatusUpdate) -> Result<(), ApiError> {
        let mut query = vec![("status", update.status.as_str().to_string())];
        if let Some(tracking) = &update.tracking_number {
            query.push(("trackingNumber", tracking.clone()));
        }
        self.execute(Method::PUT, &format!("/admin/orders/{id}/status"), &query)
            .await
    }

    // =========================================================================
    // Returns
    // =========================================================================

    /// Orders with a return on file.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn return_requests(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/admin/returns", &[]).await
    }

    /// Accept a return request.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn approve_return(&self, id: OrderId) -> Result<(), ApiError> {
        self.return_action(id, "approve", &[]).await
    }

    /// Refuse a return request. `reason` should come from
    /// [`techmart_core::cancellation_reason`].
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn reject_return(&self, id: OrderId, reason: &str) -> Result<(), ApiError> {
        self.return_action(id, "reject", &[("reason", reason.to_string())])
            .await
    }

    /// Record that the returned item arrived, and in what state.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn confirm_return_received(
        &self,
        id: OrderId,
        condition: ItemCondition,
    ) -> Result<(), ApiError> {
        self.return_action(id, "received", &[("condition", condition.as_str().to_string())])
            .await
    }

    /// Start refunding a received return.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn initiate_refund(&self, id: OrderId) -> Result<(), ApiError> {
        self.return_action(id, "refund", &[]).await
    }

    /// Mark a refund as paid out.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the transition.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn complete_refund(&self, id: OrderId) -> Result<(), ApiError> {
        self.return_action(id, "refund-complete", &[]).await
    }

    async fn return_action(
        &self,
        id: OrderId,
        action: &str,
        query: &[(&str, String)],
    ) -> Result<(), ApiError> {
        self.execute(Method::PUT, &format!("/admin/returns/{id}/{action}"), query)
            .await
    }
}

/// Errors from requests that validate a form before sending it.
#[derive(Debug, thiserror::Error)]
pub enum AdminRequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn product_multipart(form: &ProductForm, image: Option<ProductImage>) -> Result<Form, ValidationError> {
    let mut multipart = form
        .parts()?
        .into_iter()
        .fold(Form::new(), |multipart, (name, value)| multipart.text(name, value));
    if let Some(image) = image {
        multipart = multipart.part("image", Part::bytes(image.bytes).file_name(image.file_name));
    }
    Ok(multipart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use techmart_core::Price;

    use super::*;

    #[test]
    fn test_multipart_rejects_incomplete_form() {
        let form = ProductForm::new("Watch", Price::from_rupees(999), 4);
        assert!(matches!(
            product_multipart(&form, None),
            Err(ValidationError::Required("Category"))
        ));
    }

    #[test]
    fn test_multipart_has_boundary() {
        let mut form = ProductForm::new("Watch", Price::from_rupees(999), 4);
        form.category = "Wearables".into();
        form.brand = "Pulse".into();
        let image = ProductImage {
            file_name: "watch.png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };
        let multipart = product_multipart(&form, Some(image)).unwrap();
        assert!(!multipart.boundary().is_empty());
    }
}
