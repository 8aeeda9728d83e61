//! Server cart endpoints, all keyed by the shopper's email.

use reqwest::Method;
use tracing::instrument;

use techmart_core::{CartItemId, CartLine, Email, MergeLine, ProductId};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Current server cart, with image references resolved.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn cart(&self, email: &Email) -> Result<Vec<CartLine>, ApiError> {
        let lines: Vec<CartLine> = self.get("/cart", &[("email", email.to_string())]).await?;
        Ok(lines
            .into_iter()
            .map(|mut line| {
                line.image = line.image.map(|image| self.image_url(&image));
                line
            })
            .collect())
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        email: &Email,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.execute(
            Method::POST,
            "/cart/add",
            &[
                ("email", email.to_string()),
                ("productId", product_id.to_string()),
                ("quantity", quantity.to_string()),
            ],
        )
        .await
    }

    /// Set a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email, item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        email: &Email,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/cart/update/{item_id}"),
            &[("email", email.to_string()), ("quantity", quantity.to_string())],
        )
        .await
    }

    /// Drop a cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email, item_id = %item_id))]
    pub async fn remove_cart_item(&self, email: &Email, item_id: CartItemId) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/cart/remove/{item_id}"),
            &[("email", email.to_string())],
        )
        .await
    }

    /// Fold guest cart lines into the server cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, lines), fields(email = %email, lines = lines.len()))]
    pub async fn merge_cart(&self, email: &Email, lines: &[MergeLine]) -> Result<(), ApiError> {
        self.send_json(
            Method::POST,
            "/cart/merge",
            &[("email", email.to_string())],
            lines,
        )
        .await
    }

    /// Empty the server cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn clear_cart(&self, email: &Email) -> Result<(), ApiError> {
        self.execute(Method::DELETE, "/cart/clear", &[("email", email.to_string())])
            .await
    }
}
