//! Checkout, order history, returns, reviews, and profile edits.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use serde_json::{Value, json};

use techmart_client::{AppContext, ClientError, GuestCartRetention, RecordingNotifier};
use techmart_core::{
    OrderFilter, OrderId, PaymentMethod, ProductId, ProfileUpdate, ReturnReason, ReturnRequest,
    ReviewId, ShippingDetails, ValidationError,
};
use techmart_integration_tests::{FakeBackend, Reply, customer, product, signed_in_storage};

use std::sync::Arc;

const EMAIL: &str = "priya@techmart.in";

async fn signed_in(backend: &FakeBackend) -> (AppContext, Arc<RecordingNotifier>) {
    backend.add_product(5, "Noise Cancelling Headphones", 1000.0);
    let (_, storage) = signed_in_storage(&customer());
    backend
        .context(storage, GuestCartRetention::default())
        .await
}

fn shipping() -> ShippingDetails {
    ShippingDetails {
        street: "12 MG Road".into(),
        state: "Karnataka".into(),
        zip_code: "560001".into(),
        ..ShippingDetails::default()
    }
}

fn delivered_order(id: i64, days_ago: i64) -> Value {
    let delivered = (Utc::now() - Duration::days(days_ago)).naive_utc();
    json!({
        "id": id,
        "status": "DELIVERED",
        "paymentMethod": "UPI",
        "paymentStatus": "CONFIRMED",
        "totalAmount": 2360,
        "shippingAddress": "12 MG Road, Karnataka, 560001, India",
        "deliveredAt": delivered.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "items": []
    })
}

fn position(backend: &FakeBackend, method: &str, path: &str) -> usize {
    backend
        .requests()
        .iter()
        .position(|request| request.method == method && request.path == path)
        .unwrap()
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_place_order_posts_total_with_tax_then_clears_cart() {
    let backend = FakeBackend::start().await;
    let (mut context, notifier) = signed_in(&backend).await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 1000.0), 2)
        .await
        .unwrap();

    context
        .place_order(&shipping(), PaymentMethod::Upi)
        .await
        .unwrap();

    let orders = backend.requests_to("POST", "/orders");
    assert_eq!(orders.len(), 1);
    let body = orders.first().unwrap().json().unwrap();
    assert_eq!(
        body.get("shippingAddress").and_then(Value::as_str),
        Some("12 MG Road, Karnataka, 560001, India")
    );
    assert_eq!(body.get("paymentMethod").and_then(Value::as_str), Some("UPI"));
    assert_eq!(body.get("totalAmount").and_then(Value::as_f64), Some(2360.0));

    let clears = backend.requests_to("DELETE", "/cart/clear");
    assert_eq!(clears.len(), 1);
    assert_eq!(clears.first().unwrap().query("email"), Some(EMAIL));
    assert!(position(&backend, "POST", "/orders") < position(&backend, "DELETE", "/cart/clear"));

    assert!(context.cart().is_empty());
    assert_eq!(
        notifier.alerts().last().map(String::as_str),
        Some("Order placed successfully!")
    );
}

#[tokio::test]
async fn test_failed_order_keeps_cart_and_skips_clear() {
    let backend = FakeBackend::start().await;
    backend.respond("POST", "/orders", Reply::status(500));
    let (mut context, notifier) = signed_in(&backend).await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 1000.0), 1)
        .await
        .unwrap();

    let result = context.place_order(&shipping(), PaymentMethod::CashOnDelivery).await;

    assert!(matches!(result, Err(ClientError::Api(_))));
    assert_eq!(context.cart().len(), 1);
    assert!(backend.requests_to("DELETE", "/cart/clear").is_empty());
    assert_eq!(
        notifier.alerts().last().map(String::as_str),
        Some("Failed to place order. Please try again.")
    );
}

#[tokio::test]
async fn test_incomplete_shipping_sends_nothing() {
    let backend = FakeBackend::start().await;
    let (mut context, _) = signed_in(&backend).await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 1000.0), 1)
        .await
        .unwrap();

    let mut details = shipping();
    details.zip_code = "  ".into();
    let result = context.place_order(&details, PaymentMethod::Upi).await;

    assert!(matches!(
        result,
        Err(ClientError::Validation(ValidationError::IncompleteShipping))
    ));
    assert!(backend.requests_to("POST", "/orders").is_empty());
}

// ============================================================================
// Orders and returns
// ============================================================================

#[tokio::test]
async fn test_order_filters_apply_to_history() {
    let backend = FakeBackend::start().await;
    let mut refunded = delivered_order(40, 20);
    if let Some(fields) = refunded.as_object_mut() {
        fields.insert("returnStatus".into(), json!("REFUND_COMPLETED"));
        fields.insert("refundedAmount".into(), json!(2360));
    }
    backend.respond(
        "GET",
        "/orders",
        Reply::ok(&json!([
            {"id": 41, "status": "PROCESSING"},
            delivered_order(42, 2),
            refunded
        ])),
    );
    let (mut context, _) = signed_in(&backend).await;

    let orders = context.orders().await.unwrap();
    let ids = |filter: OrderFilter| -> Vec<i64> {
        orders
            .iter()
            .filter(|order| filter.matches(order))
            .map(|order| order.id.as_i64())
            .collect()
    };

    assert_eq!(ids(OrderFilter::All), [41, 42, 40]);
    assert_eq!(ids(OrderFilter::Active), [41]);
    assert_eq!(ids(OrderFilter::Refunded), [40]);
}

#[tokio::test]
async fn test_cancel_sends_reason() {
    let backend = FakeBackend::start().await;
    let (mut context, notifier) = signed_in(&backend).await;

    context
        .cancel_order(OrderId::new(41), " Ordered by mistake ")
        .await
        .unwrap();

    let cancels = backend.requests_to("PUT", "/orders/41/cancel");
    assert_eq!(cancels.len(), 1);
    assert_eq!(
        cancels.first().unwrap().query("reason"),
        Some("Ordered by mistake")
    );
    assert_eq!(notifier.alerts(), vec!["Order cancelled successfully"]);
}

#[tokio::test]
async fn test_refused_cancel_shows_backend_message() {
    let backend = FakeBackend::start().await;
    backend.respond(
        "PUT",
        "/orders/41/cancel",
        Reply::json(400, &json!({"error": "Order already shipped"})),
    );
    let (mut context, notifier) = signed_in(&backend).await;

    let result = context.cancel_order(OrderId::new(41), "Too slow").await;

    assert!(result.is_err());
    assert_eq!(notifier.alerts(), vec!["Order already shipped"]);
}

#[tokio::test]
async fn test_return_request_sends_reason_with_details() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/orders/42", Reply::ok(&delivered_order(42, 2)));
    let (mut context, notifier) = signed_in(&backend).await;

    let request = ReturnRequest::new(Some(ReturnReason::Damaged), "Cracked screen").unwrap();
    context
        .request_return(OrderId::new(42), &request)
        .await
        .unwrap();

    let returns = backend.requests_to("PUT", "/orders/42/request-return");
    assert_eq!(returns.len(), 1);
    assert_eq!(
        returns.first().unwrap().query("reason"),
        Some("Damaged product: Cracked screen")
    );
    assert_eq!(
        notifier.alerts(),
        vec!["Return request submitted successfully!"]
    );
}

#[tokio::test]
async fn test_return_outside_window_is_refused_locally() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/orders/42", Reply::ok(&delivered_order(42, 30)));
    let (mut context, _) = signed_in(&backend).await;

    let request = ReturnRequest::new(Some(ReturnReason::ChangeOfMind), "").unwrap();
    let result = context.request_return(OrderId::new(42), &request).await;

    assert!(matches!(result, Err(ClientError::Forbidden(_))));
    assert!(backend.requests_to("PUT", "/orders/42/request-return").is_empty());
}

// ============================================================================
// Reviews and profile
// ============================================================================

#[tokio::test]
async fn test_review_lifecycle() {
    let backend = FakeBackend::start().await;
    let (mut context, notifier) = signed_in(&backend).await;

    context
        .submit_review(ProductId::new(5), 4, "Great sound, average battery")
        .await
        .unwrap();
    context
        .edit_review(ReviewId::new(9), "Great sound, good battery")
        .await
        .unwrap();
    context.delete_review(ReviewId::new(9)).await.unwrap();

    let posted = backend.requests_to("POST", "/reviews/product/5");
    assert_eq!(
        posted.first().unwrap().json().unwrap(),
        json!({"rating": 4, "comment": "Great sound, average battery"})
    );
    let edited = backend.requests_to("PUT", "/reviews/9");
    assert_eq!(
        edited.first().unwrap().json().unwrap(),
        json!({"comment": "Great sound, good battery"})
    );
    assert_eq!(backend.requests_to("DELETE", "/reviews/9").len(), 1);
    assert_eq!(
        notifier.alerts(),
        vec![
            "Thank you for your review!",
            "Review updated successfully!",
            "Review deleted successfully"
        ]
    );
}

#[tokio::test]
async fn test_invalid_review_sends_nothing() {
    let backend = FakeBackend::start().await;
    let (mut context, _) = signed_in(&backend).await;

    let missing_rating = context.submit_review(ProductId::new(5), 0, "Fine").await;
    let blank_comment = context.submit_review(ProductId::new(5), 5, "   ").await;

    assert!(matches!(
        missing_rating,
        Err(ClientError::Validation(ValidationError::MissingRating))
    ));
    assert!(matches!(
        blank_comment,
        Err(ClientError::Validation(ValidationError::EmptyComment))
    ));
    assert!(backend.requests_to("POST", "/reviews/product/5").is_empty());
}

#[tokio::test]
async fn test_profile_update_merges_response() {
    let backend = FakeBackend::start().await;
    backend.respond(
        "PUT",
        "/users/profile",
        Reply::ok(&json!({"phone": "9876543210", "address": "12 MG Road, Bengaluru"})),
    );
    let (_, storage) = signed_in_storage(&customer());
    let (mut context, _) = backend
        .context(storage.clone(), GuestCartRetention::default())
        .await;

    let update = ProfileUpdate {
        phone: Some("9876543210".into()),
        address: Some("12 MG Road, Bengaluru".into()),
        ..ProfileUpdate::default()
    };
    context.update_profile(&update).await.unwrap();

    let sent = backend.requests_to("PUT", "/users/profile");
    assert_eq!(
        sent.first().unwrap().json().unwrap(),
        json!({"phone": "9876543210", "address": "12 MG Road, Bengaluru"})
    );
    let user = context.user().unwrap();
    assert_eq!(user.phone.as_deref(), Some("9876543210"));
    assert_eq!(user.first_name, "Priya");
    assert_eq!(storage.user().unwrap(), *user);
}
