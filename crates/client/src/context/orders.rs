//! Checkout and the customer side of orders and returns.

use chrono::Utc;
use tracing::instrument;

use techmart_core::{
    NewOrder, Order, OrderId, PaymentMethod, ReturnRequest, ShippingDetails, ValidationError,
    cancellation_reason,
};

use super::AppContext;
use crate::error::ClientError;

const ORDER_PLACED: &str = "Order placed successfully!";
const ORDER_FAILED: &str = "Failed to place order. Please try again.";

impl AppContext {
    /// Turn the current cart into an order.
    ///
    /// Validates the shipping form and cart, posts the order with the
    /// tax-inclusive total, clears the server cart, then empties the
    /// in-memory one.
    ///
    /// # Errors
    ///
    /// Returns error when signed out, on a validation failure, or when either
    /// backend call fails. Every failure is alerted and leaves the cart as it
    /// was.
    #[instrument(skip(self, shipping))]
    pub async fn place_order(
        &mut self,
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<(), ClientError> {
        let user = self.require_user()?;
        let order = match self.checkout_payload(shipping, payment_method) {
            Ok(order) => order,
            Err(e) => {
                self.notifier().alert(&e.to_string());
                return Err(e.into());
            }
        };

        let created = self.api.create_order(&order).await;
        let result = match created {
            Ok(()) => self.api.clear_cart(&user.email).await,
            Err(e) => Err(e),
        };
        if let Err(e) = self.call(result) {
            tracing::error!(error = %e, "Error placing order");
            self.notifier().alert(ORDER_FAILED);
            return Err(e);
        }

        self.state.cart.clear();
        tracing::info!(total = %order.total_amount, "Order placed");
        self.notifier().alert(ORDER_PLACED);
        Ok(())
    }

    fn checkout_payload(
        &self,
        shipping: &ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<NewOrder, ValidationError> {
        let shipping_address = shipping.to_address_line()?;
        if self.state.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        Ok(NewOrder {
            shipping_address,
            payment_method,
            total_amount: self.cart_totals().total,
        })
    }

    /// The signed-in customer's orders, newest first as the backend sends them.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when signed out, or the fetch error.
    #[instrument(skip(self))]
    pub async fn orders(&mut self) -> Result<Vec<Order>, ClientError> {
        self.require_user()?;
        let result = self.api.orders().await;
        self.call(result)
    }

    /// Cancel an order with a free-text reason.
    ///
    /// # Errors
    ///
    /// Returns `MissingReason` for a blank reason, or the backend's refusal.
    #[instrument(skip(self, reason))]
    pub async fn cancel_order(&mut self, id: OrderId, reason: &str) -> Result<(), ClientError> {
        let reason = cancellation_reason(reason)?;
        let result = self.api.cancel_order(id, &reason).await;
        if let Err(e) = self.call(result) {
            self.notifier().alert(&e.user_message("Cannot cancel this order"));
            return Err(e);
        }
        self.notifier().alert("Order cancelled successfully");
        Ok(())
    }

    /// Ask for a delivered order to be returned.
    ///
    /// The order is fetched first so an ineligible request is refused
    /// locally; the backend still has the final say.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the order is outside the return window or
    /// already has a return, or the backend's refusal.
    #[instrument(skip(self, request))]
    pub async fn request_return(
        &mut self,
        id: OrderId,
        request: &ReturnRequest,
    ) -> Result<(), ClientError> {
        let fetched = self.api.order(id).await;
        let order = self.call(fetched)?;
        if !order.can_request_return(Utc::now().naive_utc()) {
            return Err(ClientError::Forbidden(
                "This order is not eligible for return".to_string(),
            ));
        }
        let result = self.api.request_return(id, request).await;
        if let Err(e) = self.call(result) {
            self.notifier().alert(&e.user_message("Failed to submit return request"));
            return Err(e);
        }
        self.notifier().alert("Return request submitted successfully!");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use techmart_core::{CartItemId, CartLine, Price, UserSummary};

    use super::*;
    use crate::config::GuestCartRetention;
    use crate::context::Session;
    use crate::context::tests::offline_api;
    use crate::storage::SessionStorage;

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            street: "12 MG Road".into(),
            state: "Karnataka".into(),
            zip_code: "560001".into(),
            ..ShippingDetails::default()
        }
    }

    async fn signed_in_context() -> (AppContext, std::sync::Arc<crate::RecordingNotifier>) {
        let (api, notifier) = offline_api(SessionStorage::in_memory());
        let mut context = AppContext::bootstrap(api, GuestCartRetention::default()).await;
        let user: UserSummary = serde_json::from_value(serde_json::json!({
            "id": 3,
            "firstName": "Priya",
            "lastName": "Sharma",
            "email": "priya@techmart.in"
        }))
        .unwrap();
        context.state.session = Session::signed_in(
            user,
            secrecy::SecretString::from("jwt".to_string()),
        );
        (context, notifier)
    }

    #[tokio::test]
    async fn test_checkout_validation_is_alerted() {
        let (mut context, notifier) = signed_in_context().await;

        let result = context
            .place_order(&ShippingDetails::default(), PaymentMethod::Upi)
            .await;
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::IncompleteShipping))
        ));

        let result = context.place_order(&shipping(), PaymentMethod::Upi).await;
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::EmptyCart))
        ));
        assert_eq!(
            notifier.alerts(),
            vec!["Please fill in all shipping details", "Your cart is empty"]
        );
    }

    #[tokio::test]
    async fn test_checkout_total_includes_tax() {
        let (mut context, _) = signed_in_context().await;
        context.state.cart = vec![CartLine {
            id: CartItemId::new(1),
            product_id: None,
            name: "Headphones".into(),
            price: Price::from_rupees(1000),
            image: None,
            quantity: 2,
            brand: None,
            category: None,
        }];

        let payload = context
            .checkout_payload(&shipping(), PaymentMethod::CashOnDelivery)
            .unwrap();
        assert_eq!(payload.total_amount, Price::from_rupees(2360));
        assert_eq!(payload.shipping_address, "12 MG Road, Karnataka, 560001, India");
    }

    #[tokio::test]
    async fn test_failed_order_keeps_cart() {
        let (mut context, notifier) = signed_in_context().await;
        context.state.cart = vec![CartLine {
            id: CartItemId::new(1),
            product_id: None,
            name: "Headphones".into(),
            price: Price::from_rupees(1000),
            image: None,
            quantity: 1,
            brand: None,
            category: None,
        }];

        let result = context.place_order(&shipping(), PaymentMethod::Upi).await;
        assert!(matches!(result, Err(ClientError::Api(_))));
        assert_eq!(context.cart().len(), 1);
        assert_eq!(notifier.alerts(), vec![ORDER_FAILED]);
    }

    #[tokio::test]
    async fn test_blank_cancellation_reason_never_leaves_client() {
        let (mut context, _) = signed_in_context().await;
        assert!(matches!(
            context.cancel_order(OrderId::new(41), "  ").await,
            Err(ClientError::Validation(ValidationError::MissingReason))
        ));
    }
}
