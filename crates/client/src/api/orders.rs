//! Customer order endpoints.

use reqwest::Method;
use tracing::instrument;

use techmart_core::{NewOrder, Order, OrderId, ReturnRequest};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Place an order for the current cart contents.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, order), fields(total = %order.total_amount))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/orders", &[], order).await
    }

    /// The signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders", &[]).await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{id}"), &[]).await
    }

    /// Cancel an order. `reason` should come from
    /// [`techmart_core::cancellation_reason`].
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the cancellation.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId, reason: &str) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/orders/{id}/cancel"),
            &[("reason", reason.to_string())],
        )
        .await
    }

    /// Ask for a delivered order to be taken back.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the request.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn request_return(&self, id: OrderId, request: &ReturnRequest) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/orders/{id}/request-return"),
            &[("reason", request.wire_reason())],
        )
        .await
    }
}
